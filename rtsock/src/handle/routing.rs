use std::ops::{Deref, DerefMut};

use crate::{
    consts::{RTM_DELETE, RT_MSGHDR_LEN},
    core::kernel::Kernel,
    error::RouteError,
    types::{message::RouteMessage, routing::RouteRecord},
};

use super::kernel_handle::KernelHandle;

pub struct RouteEditor<'a, K: Kernel> {
    pub handle: &'a mut KernelHandle<K>,
}

impl<K: Kernel> Deref for RouteEditor<'_, K> {
    type Target = KernelHandle<K>;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl<K: Kernel> DerefMut for RouteEditor<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle
    }
}

impl<'a, K: Kernel> From<&'a mut KernelHandle<K>> for RouteEditor<'a, K> {
    fn from(handle: &'a mut KernelHandle<K>) -> Self {
        Self { handle }
    }
}

impl<K: Kernel> RouteEditor<'_, K> {
    /// Asks the kernel to remove `record`, returning the sequence number the
    /// request carried. The counter only moves when the write is accepted.
    pub fn delete(&mut self, record: &RouteRecord) -> Result<i32, RouteError> {
        let seq = self.seq;
        let msg = delete_request(record.raw, seq)?;

        match self.kernel.route_send(&msg) {
            Ok(n) if n > 0 => {
                self.seq += 1;
                Ok(seq)
            }
            Ok(_) => Err(RouteError::DeleteRejected {
                seq,
                reason: "routing socket took no bytes".to_string(),
            }),
            Err(e) => Err(RouteError::DeleteRejected {
                seq,
                reason: e.to_string(),
            }),
        }
    }
}

/// The original record with only the message type and sequence number
/// replaced.
pub fn delete_request(raw: &[u8], seq: i32) -> Result<Vec<u8>, RouteError> {
    let mut header = RouteMessage::parse(raw, 0)?;
    header.kind = RTM_DELETE;
    header.seq = seq;

    let mut msg = bincode::serialize(&header)?;
    msg.extend_from_slice(&raw[RT_MSGHDR_LEN..]);

    Ok(msg)
}
