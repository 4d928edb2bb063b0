//! # Drive Client
//!
//! Publishes Ackermann drive commands to the vehicle. The publisher binds to the drive endpoint
//! and conflates its queue, so a slow subscriber only ever receives the latest command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::traj_ctrl::{CollabError, DriveSink};
use comms_if::{
    eqpt::AckermannDrive,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct DriveClient {
    socket: MonitoredSocket,

    /// Number of commands published
    num_sent: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DriveClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveClient {
    /// Create a new drive client, binding the publisher to the drive endpoint.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, DriveClientError> {
        let socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            send_timeout: 10,
            conflate: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.drive_endpoint
        ).map_err(DriveClientError::SocketError)?;

        Ok(Self {
            socket,
            num_sent: 0
        })
    }

    /// Publish a single command.
    pub fn send(&mut self, cmd: &AckermannDrive) -> Result<(), DriveClientError> {
        self.socket.send_json(cmd)
            .map_err(DriveClientError::SocketError)?;

        self.num_sent += 1;

        Ok(())
    }

    pub fn num_sent(&self) -> u64 {
        self.num_sent
    }
}

impl DriveSink for DriveClient {
    fn send_drive(&mut self, cmd: &AckermannDrive) -> Result<(), CollabError> {
        self.send(cmd).map_err(|e| e.into())
    }
}
