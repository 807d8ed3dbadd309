//! Response status patterns.

/// `200`, `2XX` or `default`.
///
/// The derived order is match precedence: exact codes, then classes, then
/// `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusPattern {
    Exact(u16),
    /// Leading digit of the class, `1..=5`.
    Class(u8),
    Default,
}

impl StatusPattern {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "default" {
            return Some(StatusPattern::Default);
        }
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
            return None;
        }
        if bytes[1..].eq_ignore_ascii_case(b"XX") {
            return Some(StatusPattern::Class(bytes[0] - b'0'));
        }
        if bytes[1..].iter().all(u8::is_ascii_digit) {
            return s.parse().ok().map(StatusPattern::Exact);
        }
        None
    }

    pub fn matches(self, status: u16) -> bool {
        match self {
            StatusPattern::Exact(code) => code == status,
            StatusPattern::Class(class) => status / 100 == u16::from(class),
            StatusPattern::Default => true,
        }
    }

    /// Word appended to an operation name for response types.
    pub fn word(self) -> String {
        match self {
            StatusPattern::Exact(code) => match status_word(code) {
                Some(word) => word.to_string(),
                None => format!("Status{}", code),
            },
            StatusPattern::Class(class) => format!("{}XX", class),
            StatusPattern::Default => "Def".to_string(),
        }
    }
}

impl std::fmt::Display for StatusPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusPattern::Exact(code) => write!(f, "{}", code),
            StatusPattern::Class(class) => write!(f, "{}XX", class),
            StatusPattern::Default => f.write_str("default"),
        }
    }
}

fn status_word(code: u16) -> Option<&'static str> {
    Some(match code {
        100 => "Continue",
        101 => "SwitchingProtocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "NonAuthoritativeInfo",
        204 => "NoContent",
        205 => "ResetContent",
        206 => "PartialContent",
        301 => "MovedPermanently",
        302 => "Found",
        303 => "SeeOther",
        304 => "NotModified",
        307 => "TemporaryRedirect",
        308 => "PermanentRedirect",
        400 => "BadRequest",
        401 => "Unauthorized",
        402 => "PaymentRequired",
        403 => "Forbidden",
        404 => "NotFound",
        405 => "MethodNotAllowed",
        406 => "NotAcceptable",
        408 => "RequestTimeout",
        409 => "Conflict",
        410 => "Gone",
        412 => "PreconditionFailed",
        413 => "RequestEntityTooLarge",
        415 => "UnsupportedMediaType",
        422 => "UnprocessableEntity",
        429 => "TooManyRequests",
        500 => "InternalServerError",
        501 => "NotImplemented",
        502 => "BadGateway",
        503 => "ServiceUnavailable",
        504 => "GatewayTimeout",
        _ => return None,
    })
}
