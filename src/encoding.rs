//! Percent-encoding and parameter normalization used to build the signature
//! base string.

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use url::Url;

use crate::{SignError, SignResult};

/// Everything except `A-Z a-z 0-9 - . _ ~` is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `value` with uppercase hex digits, leaving only the
/// unreserved characters untouched.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Multi-valued request parameters. Names may repeat and insertion order
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pairs: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.push((key.into(), value.into()));
    }

    /// Inserts a pair given as raw bytes. Both sides must be valid UTF-8.
    pub fn insert_bytes(&mut self, key: &[u8], value: &[u8]) -> SignResult<()> {
        let key = utf8(key.to_vec())?;
        let value = utf8(value.to_vec())?;
        self.pairs.push((key, value));
        Ok(())
    }

    pub fn extend(&mut self, other: Parameters) {
        self.pairs.extend(other.pairs);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn get_all<'a, 'b>(&'a self, key: &'b str) -> impl Iterator<Item = &'a str> + 'b
    where
        'a: 'b,
    {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Decodes an `application/x-www-form-urlencoded` payload.
    ///
    /// `+` decodes to a space. Unlike `url::form_urlencoded`, a sequence that
    /// does not decode to UTF-8 is an error instead of being replaced.
    pub fn from_urlencoded(input: &[u8]) -> SignResult<Self> {
        let mut params = Parameters::new();
        for segment in input.split(|b| *b == b'&') {
            if segment.is_empty() {
                continue;
            }
            let mut split = segment.splitn(2, |b| *b == b'=');
            let key = split.next().unwrap_or_default();
            let value = split.next().unwrap_or_default();
            params
                .pairs
                .push((form_decode(key)?, form_decode(value)?));
        }
        Ok(params)
    }

    /// Collects a serializable sequence or struct through `serde_urlencoded`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> SignResult<Self> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| SignError::Encoding(e.to_string()))?;
        Parameters::from_urlencoded(encoded.as_bytes())
    }

    /// Encodes every key and value, sorts the pairs by encoded key then
    /// encoded value, and returns them in that order.
    pub(crate) fn encoded_sorted(&self) -> Vec<(String, String)> {
        let mut encoded: Vec<(String, String)> = self
            .pairs
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.sort();
        encoded
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Parameters {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn form_decode(raw: &[u8]) -> SignResult<String> {
    let replaced: Vec<u8> = raw
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();
    utf8(percent_decode(&replaced).collect())
}

fn utf8(bytes: Vec<u8>) -> SignResult<String> {
    String::from_utf8(bytes).map_err(|e| SignError::Encoding(e.to_string()))
}

/// Builds the normalized parameter string: `k=v` pairs of encoded keys and
/// values, sorted byte-wise, joined with `&`.
pub fn normalize_parameters(params: &Parameters) -> String {
    let mut out = String::new();
    for (i, (key, value)) in params.encoded_sorted().iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// Builds the base string URI: lowercase scheme and host, no default port,
/// no query or fragment.
pub fn normalize_url(url: &Url) -> SignResult<String> {
    let host = url
        .host_str()
        .ok_or(SignError::InvalidUrl(url::ParseError::EmptyHost))?;
    let mut out = format!(
        "{}://{}",
        url.scheme().to_ascii_lowercase(),
        host.to_ascii_lowercase()
    );
    // `Url` already drops a port equal to the scheme's default
    if let Some(port) = url.port() {
        out.push_str(&format!(":{}", port));
    }
    out.push_str(url.path());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;
    use rand::Rng;

    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        let unreserved = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
        assert_eq!(percent_encode(unreserved), unreserved);
    }

    #[test]
    fn every_other_ascii_byte_is_escaped() {
        for b in 0u8..0x80 {
            let c = b as char;
            let encoded = percent_encode(&c.to_string());
            if c.is_ascii_alphanumeric() || "-._~".contains(c) {
                assert_eq!(encoded, c.to_string());
            } else {
                assert_eq!(encoded, format!("%{:02X}", b));
            }
        }
    }

    #[test]
    fn encodes_reserved_and_multibyte() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a,b=c&d"), "a%2Cb%3Dc%26d");
        assert_eq!(percent_encode("*'()!"), "%2A%27%28%29%21");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
        assert_eq!(percent_encode("少女"), "%E5%B0%91%E5%A5%B3");
        assert_eq!(percent_encode("%41"), "%2541");
    }

    #[test]
    fn percent_encode_decodes_back() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let len = rng.random_range(1..24);
            let s: String = (0..len)
                .map(|_| {
                    let cp = rng.random_range(0x20u32..0x3000);
                    std::char::from_u32(cp).unwrap_or('?')
                })
                .collect();
            let encoded = percent_encode(&s);
            assert!(encoded
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"-._~%".contains(&b)));
            let decoded = percent_decode_str(&encoded).decode_utf8().unwrap();
            assert_eq!(decoded, s);
        }
    }

    #[test]
    fn normalize_sorts_by_key_then_value() {
        let params: Parameters = vec![
            ("b5", "=%3D"),
            ("a3", "a"),
            ("c@", ""),
            ("a2", "r b"),
            ("c2", ""),
            ("a3", "2 q"),
        ]
        .into_iter()
        .collect();
        // https://tools.ietf.org/html/rfc5849#section-3.4.1.3.2
        assert_eq!(
            normalize_parameters(&params),
            "a2=r%20b&a3=2%20q&a3=a&b5=%3D%253D&c%40=&c2="
        );
    }

    #[test]
    fn normalize_ignores_insertion_order() {
        let pairs = vec![
            ("status", "hello world"),
            ("include_entities", "true"),
            ("a", "2"),
            ("a", "10"),
            ("a", "1"),
            ("Z", "upper"),
        ];
        let expected = normalize_parameters(&pairs.iter().cloned().collect());
        let mut rotated = pairs.clone();
        for _ in 0..pairs.len() {
            rotated.rotate_left(1);
            assert_eq!(normalize_parameters(&rotated.iter().cloned().collect()), expected);
        }
        let mut reversed = pairs;
        reversed.reverse();
        assert_eq!(normalize_parameters(&reversed.into_iter().collect()), expected);
        assert_eq!(expected, "Z=upper&a=1&a=10&a=2&include_entities=true&status=hello%20world");
    }

    #[test]
    fn normalize_empty_set() {
        assert_eq!(normalize_parameters(&Parameters::new()), "");
    }

    #[test]
    fn normalize_url_lowercases_and_drops_default_port() {
        let url = Url::parse("HTTP://Example.COM:80/r%20v/X?id=123#frag").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "http://example.com/r%20v/X");
        let url = Url::parse("https://www.example.net:443/path").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "https://www.example.net/path");
    }

    #[test]
    fn normalize_url_keeps_explicit_port() {
        let url = Url::parse("https://www.example.net:8080/?q=1").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "https://www.example.net:8080/");
        let url = Url::parse("http://example.com:443/a").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "http://example.com:443/a");
    }

    #[test]
    fn normalize_url_without_host_fails() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(normalize_url(&url), Err(SignError::InvalidUrl(_))));
    }

    #[test]
    fn urlencoded_decoding() {
        let params =
            Parameters::from_urlencoded(b"status=Hello+Ladies+%2B+Gentlemen&flag&&empty=").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(
            params.get_all("status").collect::<Vec<_>>(),
            vec!["Hello Ladies + Gentlemen"]
        );
        assert_eq!(params.get_all("flag").collect::<Vec<_>>(), vec![""]);
        assert_eq!(params.get_all("empty").collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn get_all_outlives_key() {
        let params: Parameters = vec![("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let values: Vec<&str> = {
            let key = String::from("a");
            params.get_all(&key).collect()
        };
        assert_eq!(values, vec!["1", "3"]);
    }

    #[test]
    fn urlencoded_rejects_invalid_utf8() {
        let result = Parameters::from_urlencoded(b"name=%FF%FE");
        assert!(matches!(result, Err(SignError::Encoding(_))));
    }

    #[test]
    fn insert_bytes_rejects_invalid_utf8() {
        let mut params = Parameters::new();
        assert!(params.insert_bytes(b"ok", b"fine").is_ok());
        assert!(matches!(
            params.insert_bytes(b"bad", &[0xC3, 0x28]),
            Err(SignError::Encoding(_))
        ));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn from_serialize_collects_pairs() {
        let params =
            Parameters::from_serialize(&[("include_entities", "true"), ("status", "a b")]).unwrap();
        assert_eq!(
            normalize_parameters(&params),
            "include_entities=true&status=a%20b"
        );
    }
}
