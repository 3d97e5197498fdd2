use crate::{
    consts::{RTAX_MAX, RTM_VERSION, RT_MSGHDR_LEN},
    error::RouteError,
    roundup,
    types::{
        addr::{self, AddrRole, AddressEntry, ParseContext},
        message::RouteMessage,
        routing::RouteRecord,
    },
};

/// Lazy walk over a routing table dump. Each step advances by the record's
/// declared length. The first error ends the walk.
pub struct RouteRecords<'a> {
    buf: &'a [u8],
    offset: usize,
    ctx: ParseContext,
    failed: bool,
}

impl<'a> From<&'a [u8]> for RouteRecords<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            ctx: ParseContext::default(),
            failed: false,
        }
    }
}

impl<'a> Iterator for RouteRecords<'a> {
    type Item = Result<RouteRecord<'a>, RouteError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.offset < self.buf.len() {
            let offset = self.offset;

            let (header, raw) = match split_record(self.buf, offset) {
                Ok(record) => record,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            self.offset += raw.len();

            if header.version != RTM_VERSION {
                tracing::debug!(offset, version = header.version, "skipping record");
                continue;
            }

            self.ctx.reset();
            return match decode_addresses(&header, raw, offset, &mut self.ctx) {
                Ok(addresses) => Some(Ok(RouteRecord {
                    offset,
                    header,
                    addresses,
                    raw,
                })),
                Err(e) => {
                    self.failed = true;
                    Some(Err(e))
                }
            };
        }

        None
    }
}

/// Header and bytes of the record starting at `offset`, with the declared
/// length checked against the header size and the remaining buffer.
fn split_record(buf: &[u8], offset: usize) -> Result<(RouteMessage, &[u8]), RouteError> {
    let rest = &buf[offset..];
    let header = RouteMessage::parse(rest, offset)?;
    let len = header.msg_len as usize;

    if len < RT_MSGHDR_LEN {
        return Err(RouteError::RecordOverrun {
            offset,
            needed: RT_MSGHDR_LEN,
            available: len,
        });
    }

    if len > rest.len() {
        return Err(RouteError::RecordOverrun {
            offset,
            needed: len,
            available: rest.len(),
        });
    }

    Ok((header, &rest[..len]))
}

fn decode_addresses(
    header: &RouteMessage,
    raw: &[u8],
    offset: usize,
    ctx: &mut ParseContext,
) -> Result<Vec<AddressEntry>, RouteError> {
    let mask = header.addr_mask();
    let mut cursor = RT_MSGHDR_LEN;
    let mut addresses = Vec::new();

    for role in (0..RTAX_MAX).filter_map(AddrRole::from_index) {
        if mask & role.bit() == 0 {
            continue;
        }

        let overrun = |needed| RouteError::RecordOverrun {
            offset,
            needed,
            available: raw.len(),
        };

        let sa_len = *raw.get(cursor).ok_or_else(|| overrun(cursor + 1))? as usize;
        if cursor + sa_len > raw.len() {
            return Err(overrun(cursor + sa_len));
        }

        let bytes = &raw[cursor..cursor + sa_len];
        match addr::decode(role, ctx, bytes) {
            Ok(entry) => addresses.push(entry),
            Err(RouteError::UnknownAddressFamily { family }) => {
                tracing::debug!(offset, ?role, family, "address left undecoded");
                addresses.push(AddressEntry::unknown(role, bytes, family));
            }
            Err(e) => return Err(e),
        }

        // the last address may end the record without its padding
        cursor = (cursor + roundup(sa_len)).min(raw.len());
    }

    if cursor < raw.len() {
        tracing::debug!(offset, unread = raw.len() - cursor, "record has bytes past its addresses");
    }

    Ok(addresses)
}
