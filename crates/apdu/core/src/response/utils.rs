//! Helpers for splitting raw response bytes

use super::error::ResponseError;
use super::status::StatusWord;

/// Split a raw response into its trailing status word and payload
pub fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    match data {
        [payload @ .., sw1, sw2] => Ok((StatusWord::new(*sw1, *sw2), payload)),
        _ => Err(ResponseError::Incomplete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_status_and_payload() {
        let (status, payload) = extract_status_and_payload(&[0x01, 0x02, 0x61, 0x10]).unwrap();
        assert_eq!(status, StatusWord::new(0x61, 0x10));
        assert_eq!(payload, &[0x01, 0x02]);

        let (status, payload) = extract_status_and_payload(&[0x90, 0x00]).unwrap();
        assert!(status.is_success());
        assert!(payload.is_empty());

        assert_eq!(
            extract_status_and_payload(&[0x90]),
            Err(ResponseError::Incomplete)
        );
        assert_eq!(extract_status_and_payload(&[]), Err(ResponseError::Incomplete));
    }
}
