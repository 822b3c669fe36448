//! This module exports a minimal message-passing API, encapsulated by a
//! `Communicator` trait. Box and partition metadata are replicated: every
//! rank holds the same tables, so the only collective needed by this crate is
//! a broadcast from a root rank. Implementors write `send` and `recv` for a
//! given transport; the trait provides the broadcast. An in-process
//! implementation over crossbeam channels is included for running collective
//! code with one thread per rank.
//!

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::error::Error;




/// Interface for a group of processes that can exchange messages. The
/// underlying transport can in principle be threads, TCP, or a higher level
/// abstraction like MPI.
///
pub trait Communicator {
    /// Must be implemented to return the rank of this process within the
    /// communicator.
    fn rank(&self) -> usize;

    /// Must be implemented to return the number of peers processes in this
    /// communicator.
    fn size(&self) -> usize;

    /// Must be implemented to send a message to a peer. This method must
    /// return immediately, in other words it is not allowed to block until a
    /// matching receive is posted.
    fn send(&self, rank: usize, message: Vec<u8>);

    /// Must be implemented to receive a message from any of the peers. This
    /// method is allowed to block until a message is ready to be received.
    fn recv(&self) -> Vec<u8>;

    /// Implements a binomial tree broadcast from rank 0. The message buffer
    /// must be `Some` if this is the root, and it must be `None` otherwise.
    ///
    fn broadcast(&self, value: Option<Vec<u8>>) -> Vec<u8> {
        let r = self.rank();
        let p = self.size();

        let value = match value {
            Some(value) => value,
            None => self.recv(),
        };
        for level in (0..ceil_log2(p)).rev() {
            let one = 1 << level;
            let two = 1 << (level + 1);

            if r % two == 0 && r + one < p {
                debug!("[{}] forwarding {} bytes to {}", r, value.len(), r + one);
                self.send(r + one, value.clone())
            }
        }
        value
    }
}




/// Compute the log-base-two of the next power of two: 8 -> 3, 9 -> 4.
///
pub fn ceil_log2(x: usize) -> usize {
    let mut n = 0;
    while 1 << n < x {
        n += 1
    }
    n
}




/// Replicate a value from rank 0 onto every rank of the communicator. The
/// value is CBOR-encoded on the root; the argument is ignored on the other
/// ranks. Must be called collectively.
///
pub fn broadcast_value<C, T>(comm: &C, value: &T) -> Result<T, Error>
where
    C: Communicator + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let bytes = if comm.rank() == 0 {
        let mut buffer = Vec::new();
        ciborium::ser::into_writer(value, &mut buffer)
            .map_err(|e| Error::Encode(format!("{:?}", e)))?;
        Some(buffer)
    } else {
        None
    };
    let bytes = comm.broadcast(bytes);

    ciborium::de::from_reader(&bytes[..]).map_err(|e| Error::Decode(format!("{:?}", e)))
}




/// A communicator whose ranks are threads in the same process. Create the
/// whole group at once with `ThreadCommunicator::group`, then move one member
/// onto each thread.
///
pub struct ThreadCommunicator {
    rank: usize,
    peers: Vec<Sender<Vec<u8>>>,
    inbox: Receiver<Vec<u8>>,
}

impl ThreadCommunicator {
    pub fn group(size: usize) -> Vec<Self> {
        assert!(size > 0, "communicator group must have at least one rank");

        let (peers, inboxes): (Vec<_>, Vec<_>) = (0..size)
            .map(|_| crossbeam_channel::unbounded())
            .unzip();

        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self { rank, peers: peers.clone(), inbox })
            .collect()
    }
}

impl Communicator for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, rank: usize, message: Vec<u8>) {
        self.peers[rank].send(message).unwrap()
    }

    fn recv(&self) -> Vec<u8> {
        self.inbox.recv().unwrap()
    }
}
