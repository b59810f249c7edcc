//! Decoder for Safari's `Cookies.binarycookies` container.
//!
//! The container is mixed-endian: page count and page sizes are
//! big-endian, everything inside a page is little-endian, and string
//! offsets are relative to the start of each cookie record. Timestamps
//! are IEEE-754 doubles of seconds since the Mac epoch (2001-01-01).
//! The file ends with a 4-byte checksum, an 8-byte footer with two
//! historical encodings, and an optional binary property-list blob.
//!
//! Malformed records and pages are skipped with a warning; only a bad
//! magic or a file shorter than the fixed header is fatal.

use url::Url;

use tracing::{debug, warn};

use crate::binary::ByteReader;
use crate::error::ParseError;
use crate::types::{CookieFlags, RawCookie};
use crate::util::time::mac_epoch_to_unix;

const MAGIC: &[u8; 4] = b"cook";
const PAGE_HEADER: u32 = 0x0000_0100;
const PAGE_FOOTER: u32 = 0;
/// Footer written by Safari before version 14.
const FOOTER_LEGACY: u64 = 0x0717_2005_0000_004b;
/// Footer written by Safari 14 and later.
const FOOTER_MODERN: u64 = 0x0000_0028_0000_0000;
const MIN_RECORD_SIZE: usize = 48;

/// Decodes a complete `Cookies.binarycookies` buffer into raw cookie
/// records, in page order, then record order within each page.
pub fn decode_binary_cookies(data: &[u8]) -> Result<Vec<RawCookie>, ParseError> {
    if data.len() < 8 {
        return Err(ParseError::Truncated("shorter than magic and page count"));
    }
    if &data[..4] != MAGIC {
        return Err(ParseError::BadMagic);
    }

    let mut reader = ByteReader::new(data);
    reader.seek(4)?;
    let page_count = reader.read_u32_be()? as usize;

    let mut page_sizes = Vec::new();
    for _ in 0..page_count {
        page_sizes.push(reader.read_u32_be()? as usize);
    }

    let mut cookies = Vec::new();
    for (index, &size) in page_sizes.iter().enumerate() {
        let start = reader.position();
        let page = match reader.subrange(start, size) {
            Ok(page) => page,
            Err(err) => {
                warn!(page = index, %err, "page extends past end of file, stopping");
                return Ok(cookies);
            }
        };
        match decode_page(page.slice()) {
            Ok(mut page_cookies) => cookies.append(&mut page_cookies),
            Err(err) => warn!(page = index, %err, "skipping malformed page"),
        }
        reader.seek(start + size)?;
    }

    read_trailer(&mut reader);
    Ok(cookies)
}

fn decode_page(page: &[u8]) -> Result<Vec<RawCookie>, ParseError> {
    let mut reader = ByteReader::new(page);
    if reader.read_u32_be()? != PAGE_HEADER {
        return Err(ParseError::InvalidPage("bad page header"));
    }

    let count = reader.read_u32_le()? as usize;
    let table_len = count
        .checked_mul(4)
        .ok_or(ParseError::InvalidPage("cookie count overflow"))?;
    reader.ensure(table_len)?;

    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(reader.read_u32_le()? as usize);
    }

    if reader.read_u32_be()? != PAGE_FOOTER {
        return Err(ParseError::InvalidPage("bad page footer"));
    }

    let mut cookies = Vec::with_capacity(offsets.len());
    for (index, &offset) in offsets.iter().enumerate() {
        match decode_record(page, offset) {
            Ok(cookie) => cookies.push(cookie),
            Err(err) => warn!(record = index, offset, %err, "skipping malformed cookie record"),
        }
    }
    Ok(cookies)
}

fn decode_record(page: &[u8], offset: usize) -> Result<RawCookie, ParseError> {
    if offset >= page.len() {
        return Err(ParseError::InvalidRecord("record offset outside page"));
    }

    let mut head = ByteReader::new(&page[offset..]);
    let size = head.read_u32_le()? as usize;
    if size < MIN_RECORD_SIZE || size > page.len() - offset {
        return Err(ParseError::InvalidRecord(
            "undersized or overflowing record size",
        ));
    }

    // All further reads are bounded by the record's declared size.
    let record = &page[offset..offset + size];
    let mut reader = ByteReader::new(record);
    reader.seek(4)?;
    let version = reader.read_u32_le()?;
    let flags = CookieFlags::from_bits(reader.read_u32_le()?);
    let has_port = reader.read_u32_le()?;
    let url_offset = reader.read_u32_le()? as usize;
    let name_offset = reader.read_u32_le()? as usize;
    let path_offset = reader.read_u32_le()? as usize;
    let value_offset = reader.read_u32_le()? as usize;
    let comment_offset = reader.read_u32_le()? as usize;
    let comment_url_offset = reader.read_u32_le()? as usize;
    let expiry = mac_epoch_to_unix(reader.read_f64_le()?);
    let creation = mac_epoch_to_unix(reader.read_f64_le()?);
    let port = if has_port != 0 {
        Some(reader.read_u16_le()?)
    } else {
        None
    };

    let declared = [
        url_offset,
        name_offset,
        path_offset,
        value_offset,
        comment_offset,
        comment_url_offset,
    ];
    let url = read_text_field(record, url_offset, &declared)?.unwrap_or_default();
    let name = read_text_field(record, name_offset, &declared)?.unwrap_or_default();
    let path = read_text_field(record, path_offset, &declared)?
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());
    let value = read_bytes_field(record, value_offset, &declared)?.unwrap_or_default();
    let comment = read_text_field(record, comment_offset, &declared)?;
    let comment_url = read_text_field(record, comment_url_offset, &declared)?;

    Ok(RawCookie {
        name,
        value,
        domain: host_from_stored_url(&url),
        path,
        expiry,
        creation,
        flags,
        version: (version != 0).then_some(version),
        port,
        comment,
        comment_url,
    })
}

/// A string field ends at its NUL or at the next declared offset,
/// whichever comes first.
fn field_window(record_len: usize, offset: usize, declared: &[usize]) -> usize {
    declared
        .iter()
        .copied()
        .filter(|&o| o > offset)
        .min()
        .unwrap_or(record_len)
        .min(record_len)
}

fn read_text_field(
    record: &[u8],
    offset: usize,
    declared: &[usize],
) -> Result<Option<String>, ParseError> {
    if offset == 0 {
        return Ok(None);
    }
    if offset >= record.len() {
        return Err(ParseError::InvalidRecord("string offset outside record"));
    }
    let end = field_window(record.len(), offset, declared);
    let mut reader = ByteReader::new(record);
    reader.seek(offset)?;
    reader.read_cstr(end - offset).map(Some)
}

fn read_bytes_field(
    record: &[u8],
    offset: usize,
    declared: &[usize],
) -> Result<Option<Vec<u8>>, ParseError> {
    if offset == 0 {
        return Ok(None);
    }
    if offset >= record.len() {
        return Err(ParseError::InvalidRecord("string offset outside record"));
    }
    let end = field_window(record.len(), offset, declared);
    let mut reader = ByteReader::new(record);
    reader.seek(offset)?;
    Ok(Some(reader.read_bytes_until_nul(end - offset).to_vec()))
}

/// The stored URL field usually holds a bare domain like
/// `.example.com`; occasionally it is a full URL. The leading dot is
/// preserved here and stripped at the export boundary.
fn host_from_stored_url(raw: &str) -> String {
    if raw.contains("://") {
        if let Ok(parsed) = Url::parse(raw) {
            if let Some(host) = parsed.host_str() {
                return host.to_string();
            }
        }
    }
    raw.trim().to_string()
}

/// Checksum and footer after the last page are diagnostic only; a
/// mismatched footer is logged and never fails the file.
fn read_trailer(reader: &mut ByteReader<'_>) {
    let checksum = match reader.read_u32_be() {
        Ok(checksum) => checksum,
        Err(_) => {
            debug!("file ends without checksum and footer");
            return;
        }
    };
    debug!(checksum, "container checksum");

    match reader.read_u64_be() {
        Ok(FOOTER_LEGACY) | Ok(FOOTER_MODERN) => {}
        Ok(other) => warn!(footer = format_args!("{other:#018x}"), "unrecognized container footer"),
        Err(_) => warn!("container footer missing"),
    }

    if reader.remaining() > 0 {
        debug!(
            len = reader.remaining(),
            "trailing property-list metadata present"
        );
    }
}
