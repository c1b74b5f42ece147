// SS Key and Ciphertext Codec
// Line-oriented hex text format for public keys, private keys and ciphertext blocks

use std::io::{BufRead, Read, Write};

use super::keygen::{SsPrivateKey, SsPublicKey};
use super::numtheory::{from_hex, SsBigInt};
use crate::error::{SsError, SsResult};

/// Longest accepted owner name in bytes
pub const MAX_OWNER_LEN: usize = 1024;

/// Longest accepted hex line in bytes
pub const MAX_HEX_LINE_LEN: usize = 1 << 20;

/// Read one line of at most `limit` bytes, without its line terminator.
/// Returns None at end of stream.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    line: usize,
    limit: usize,
) -> SsResult<Option<String>> {
    let mut buf = Vec::new();
    // room for "\r\n" after a line of exactly `limit` bytes
    let read = reader
        .by_ref()
        .take(limit as u64 + 2)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if buf.len() > limit {
        return Err(SsError::LineTooLong { line, limit });
    }

    String::from_utf8(buf).map(Some).map_err(|_| SsError::Parse {
        line,
        reason: "not valid UTF-8".to_string(),
    })
}

/// Strict hex: non-empty, digits only, no sign or separators
fn parse_hex(text: &str, line: usize, field: &'static str) -> SsResult<SsBigInt> {
    let digits = text.trim();
    if digits.is_empty() {
        return Err(SsError::MissingField { line, field });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SsError::Parse {
            line,
            reason: format!("{} is not a hexadecimal number", field),
        });
    }

    from_hex(digits).ok_or_else(|| SsError::Parse {
        line,
        reason: format!("{} is not a hexadecimal number", field),
    })
}

fn read_hex_field<R: BufRead>(
    reader: &mut R,
    line: usize,
    field: &'static str,
) -> SsResult<SsBigInt> {
    let text = read_bounded_line(reader, line, MAX_HEX_LINE_LEN)?
        .ok_or(SsError::MissingField { line, field })?;
    parse_hex(&text, line, field)
}

/// Write a public key: hex(n), newline, owner, newline
pub fn write_public_key<W: Write>(mut writer: W, public_key: &SsPublicKey) -> SsResult<()> {
    let owner = &public_key.owner;
    if owner.len() > MAX_OWNER_LEN || owner.contains(['\n', '\r']) {
        return Err(SsError::InvalidPublicKey);
    }

    writeln!(writer, "{:x}", public_key.n)?;
    writeln!(writer, "{}", owner)?;
    writer.flush()?;
    Ok(())
}

/// Read a public key written by [`write_public_key`]
/// The owner line is kept byte for byte, only its terminator is dropped
pub fn read_public_key<R: BufRead>(mut reader: R) -> SsResult<SsPublicKey> {
    let n = read_hex_field(&mut reader, 1, "modulus n")?;
    let owner = read_bounded_line(&mut reader, 2, MAX_OWNER_LEN)?
        .ok_or(SsError::MissingField { line: 2, field: "owner" })?;

    SsPublicKey::new(n, owner)
}

/// Write a private key: hex(pq), newline, hex(d), newline
pub fn write_private_key<W: Write>(mut writer: W, private_key: &SsPrivateKey) -> SsResult<()> {
    writeln!(writer, "{:x}", private_key.pq)?;
    writeln!(writer, "{:x}", private_key.d)?;
    writer.flush()?;
    Ok(())
}

/// Read a private key written by [`write_private_key`]
pub fn read_private_key<R: BufRead>(mut reader: R) -> SsResult<SsPrivateKey> {
    let pq = read_hex_field(&mut reader, 1, "modulus pq")?;
    let d = read_hex_field(&mut reader, 2, "exponent d")?;

    SsPrivateKey::new(pq, d)
}

/// Write one ciphertext block as a hex line
pub fn write_ciphertext_line<W: Write>(mut writer: W, c: &SsBigInt) -> SsResult<()> {
    writeln!(writer, "{:x}", c)?;
    Ok(())
}

/// Iterator over hex ciphertext lines, blank lines skipped
pub struct CiphertextLines<R> {
    reader: R,
    line: usize,
    done: bool,
}

impl<R: BufRead> CiphertextLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            done: false,
        }
    }

    fn next_block(&mut self) -> SsResult<Option<SsBigInt>> {
        loop {
            self.line += 1;
            let text = match read_bounded_line(&mut self.reader, self.line, MAX_HEX_LINE_LEN)? {
                Some(text) => text,
                None => return Ok(None),
            };

            if text.trim().is_empty() {
                continue;
            }
            return parse_hex(&text, self.line, "ciphertext block").map(Some);
        }
    }
}

impl<R: BufRead> Iterator for CiphertextLines<R> {
    type Item = SsResult<SsBigInt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_block() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ss::numtheory::from_u64;
    use crate::ss::test_support::{test_private_key, test_public_key};

    #[test]
    fn test_public_key_format() {
        let key = SsPublicKey::new(from_u64(0xdead_beef), "alice").unwrap();
        let mut out = Vec::new();
        write_public_key(&mut out, &key).unwrap();
        assert_eq!(out, b"deadbeef\nalice\n");
    }

    #[test]
    fn test_private_key_format() {
        let key = SsPrivateKey::new(from_u64(77), from_u64(29)).unwrap();
        let mut out = Vec::new();
        write_private_key(&mut out, &key).unwrap();
        assert_eq!(out, b"4d\n1d\n");
    }

    #[test]
    fn test_keys_read_back_unchanged() {
        let public_key = test_public_key();
        let private_key = test_private_key();

        let mut pub_text = Vec::new();
        write_public_key(&mut pub_text, &public_key).unwrap();
        let mut priv_text = Vec::new();
        write_private_key(&mut priv_text, &private_key).unwrap();

        assert_eq!(read_public_key(pub_text.as_slice()).unwrap(), public_key);
        assert_eq!(read_private_key(priv_text.as_slice()).unwrap(), private_key);
    }

    #[test]
    fn test_read_accepts_crlf_and_uppercase() {
        let key = read_public_key(&b"DEADBEEF\r\nbob\r\n"[..]).unwrap();
        assert_eq!(key.n, from_u64(0xdead_beef));
        assert_eq!(key.owner, "bob");
    }

    #[test]
    fn test_read_public_key_missing_owner() {
        let result = read_public_key(&b"deadbeef\n"[..]);
        assert!(matches!(
            result,
            Err(SsError::MissingField { line: 2, field: "owner" })
        ));
    }

    #[test]
    fn test_read_rejects_garbage() {
        assert!(matches!(
            read_public_key(&b"hello there\nalice\n"[..]),
            Err(SsError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            read_private_key(&b"4d\n1_d\n"[..]),
            Err(SsError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            read_private_key(&b"4d\n"[..]),
            Err(SsError::MissingField { line: 2, .. })
        ));
        assert!(matches!(
            read_private_key(&b""[..]),
            Err(SsError::MissingField { line: 1, .. })
        ));
        assert!(matches!(
            read_public_key(&b"1\nalice\n"[..]),
            Err(SsError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_owner_length_bounded() {
        let mut text = b"deadbeef\n".to_vec();
        text.extend(std::iter::repeat(b'a').take(MAX_OWNER_LEN + 1));
        text.push(b'\n');

        assert!(matches!(
            read_public_key(text.as_slice()),
            Err(SsError::LineTooLong { line: 2, limit: MAX_OWNER_LEN })
        ));

        let mut exact = b"deadbeef\n".to_vec();
        exact.extend(std::iter::repeat(b'a').take(MAX_OWNER_LEN));
        exact.push(b'\n');
        assert_eq!(read_public_key(exact.as_slice()).unwrap().owner.len(), MAX_OWNER_LEN);
    }

    #[test]
    fn test_write_rejects_multiline_owner() {
        let key = SsPublicKey::new(from_u64(0xdead_beef), "eve\nmallory").unwrap();
        assert!(matches!(
            write_public_key(Vec::new(), &key),
            Err(SsError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_owner_whitespace_preserved() {
        let key = SsPublicKey::new(from_u64(0xdead_beef), " alice ").unwrap();
        let mut out = Vec::new();
        write_public_key(&mut out, &key).unwrap();
        assert_eq!(out, b"deadbeef\n alice \n");

        let back = read_public_key(out.as_slice()).unwrap();
        assert_eq!(back, key);
        assert_eq!(back.owner, " alice ");
    }

    #[test]
    fn test_ciphertext_lines() {
        let input = "ff\n\n  \n10\n";
        let blocks: Vec<SsBigInt> = CiphertextLines::new(input.as_bytes())
            .collect::<SsResult<_>>()
            .unwrap();
        assert_eq!(blocks, vec![from_u64(255), from_u64(16)]);

        let mut out = Vec::new();
        for c in &blocks {
            write_ciphertext_line(&mut out, c).unwrap();
        }
        assert_eq!(out, b"ff\n10\n");
    }

    #[test]
    fn test_ciphertext_lines_stop_after_error() {
        let mut lines = CiphertextLines::new(&b"ff\n-1\n10\n"[..]);
        assert!(lines.next().unwrap().is_ok());
        assert!(matches!(lines.next(), Some(Err(SsError::Parse { line: 2, .. }))));
        assert!(lines.next().is_none());
    }
}
