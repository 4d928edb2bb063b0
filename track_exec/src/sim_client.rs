//! # Simulation Client
//!
//! The SimClient provides the vehicle's state from the simulation. The simulation runs a
//! request/reply model state service: the client sends a [`ModelStateRequest`] naming the
//! vehicle's model and blocks until the [`ModelStateResponse`] arrives or the receive timeout
//! elapses.
//!
//! A failed query is retried a configured number of times before the failure is reported, so that
//! trajectory control only ever sees a sample or a definite failure.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use crate::traj_ctrl::{CollabError, StateSource};
use comms_if::{
    eqpt::{ModelState, ModelStateRequest, ModelStateResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimClient {
    socket: MonitoredSocket,

    request: ModelStateRequest,

    /// Number of times a failed query is retried before giving up
    retries: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimClientError {

    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("The server could not provide the state of {0}: {1}")]
    QueryFailed(String, String),

    #[error("The server reported success but sent no state")]
    MissingState,

    #[error("Query failed after {0} attempts, last error: {1}")]
    RetriesExhausted(usize, Box<SimClientError>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimClient {
    /// Create a new instance of the simulation client.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        model_name: &str,
        retries: usize
    ) -> Result<Self, SimClientError> {

        let socket_options = SocketOptions {
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 100,
            send_timeout: 100,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.sim_endpoint
        ).map_err(SimClientError::SocketError)?;

        Ok(Self {
            socket,
            request: ModelStateRequest {
                model_name: model_name.into()
            },
            retries
        })
    }

    /// Query the model state, retrying on failure.
    pub fn query(&mut self) -> Result<ModelState, SimClientError> {
        let attempts = self.retries + 1;
        let mut attempt = 1;

        loop {
            match self.query_once() {
                Ok(s) => return Ok(s),
                Err(e) if attempt < attempts => {
                    debug!("Model state query attempt {} failed: {}", attempt, e);
                    attempt += 1;
                },
                Err(e) => {
                    warn!("Model state query failed after {} attempts", attempts);
                    return Err(SimClientError::RetriesExhausted(attempts, Box::new(e)))
                }
            }
        }
    }

    fn query_once(&mut self) -> Result<ModelState, SimClientError> {
        if !self.socket.connected() {
            return Err(SimClientError::NotConnected)
        }

        self.socket.send_json(&self.request)
            .map_err(SimClientError::SocketError)?;

        let response: ModelStateResponse = self.socket.recv_json()
            .map_err(SimClientError::SocketError)?;

        check_response(response, &self.request.model_name)
    }
}

impl StateSource for SimClient {
    fn get_state(&mut self) -> Result<ModelState, CollabError> {
        self.query().map_err(|e| e.into())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Extract the model state from a response.
fn check_response(
    response: ModelStateResponse,
    model_name: &str
) -> Result<ModelState, SimClientError> {
    if !response.success {
        return Err(SimClientError::QueryFailed(model_name.into(), response.status_message))
    }

    response.state.ok_or(SimClientError::MissingState)
}
