//! String format checks.
//!
//! Each format owns a precompiled pattern. A few formats need more than a
//! regular expression can express and add a predicate on top.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Check, CheckParams, CheckStep};
use crate::error::{IssueKind, RawIssue};
use crate::schema::Computed;
use crate::validation::ParsePayload;
use crate::value::Value;

const DATE: &str = r"(\d\d[2468][048]|\d\d[13579][26]|\d\d0[48]|[02468][048]00|[13579][26]00)-02-29|\d{4}-((0[13578]|1[02])-(0[1-9]|[12]\d|3[01])|(0[469]|11)-(0[1-9]|[12]\d|30)|(02)-(0[1-9]|1\d|2[0-8]))";
const TIME: &str = r"([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?";
const IPV4: &str = r"((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)";

fn compile(source: &str) -> Regex {
    // Sources are constants; a failure here is caught by the format tests.
    Regex::new(source).unwrap_or_else(|err| panic!("invalid format pattern {}: {}", source, err))
}

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    compile(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
});
static URL: Lazy<Regex> =
    Lazy::new(|| compile(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+([/?#]\S*)?$"));
static UUID: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?i:[0-9a-f]{8}-[0-9a-f]{4}-[1-8][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}|00000000-0000-0000-0000-000000000000|ffffffff-ffff-ffff-ffff-ffffffffffff)$")
});
static GUID: Lazy<Regex> =
    Lazy::new(|| compile(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"));
static IPV4_RE: Lazy<Regex> = Lazy::new(|| compile(&format!("^{}$", IPV4)));
static IPV6_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9a-fA-F:]*:[0-9a-fA-F:.]*$"));
static CIDRV4: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"^{}/([0-9]|[1-2][0-9]|3[0-2])$", IPV4)));
static CIDRV6: Lazy<Regex> =
    Lazy::new(|| compile(r"^[0-9a-fA-F:]*:[0-9a-fA-F:.]*/(12[0-8]|1[01][0-9]|[1-9]?[0-9])$"));
static BASE64: Lazy<Regex> = Lazy::new(|| {
    compile(r"^([0-9a-zA-Z+/]{4})*(([0-9a-zA-Z+/]{2}==)|([0-9a-zA-Z+/]{3}=))?$")
});
static BASE64URL: Lazy<Regex> = Lazy::new(|| compile(r"^[A-Za-z0-9_-]*$"));
static JWT: Lazy<Regex> =
    Lazy::new(|| compile(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$"));
static NANOID: Lazy<Regex> = Lazy::new(|| compile(r"^[a-zA-Z0-9_-]{21}$"));
static CUID: Lazy<Regex> = Lazy::new(|| compile(r"^[cC][^\s-]{8,}$"));
static CUID2: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9a-z]+$"));
static ULID: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$"));
static E164: Lazy<Regex> = Lazy::new(|| compile(r"^\+[0-9]{6,14}[0-9]$"));
static EMOJI: Lazy<Regex> =
    Lazy::new(|| compile(r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$"));
static ISO_DATE: Lazy<Regex> = Lazy::new(|| compile(&format!("^({})$", DATE)));
static ISO_TIME: Lazy<Regex> = Lazy::new(|| compile(&format!("^{}$", TIME)));
static ISO_DATETIME: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"^({})T{}(Z|[+-]\d{{2}}:?\d{{2}})$", DATE, TIME)));
static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    compile(r"^P((\d+W)|((\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+([.,]\d+)?S)?)?))$")
});

/// A named string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Guid,
    Ipv4,
    Ipv6,
    Cidrv4,
    Cidrv6,
    Base64,
    Base64Url,
    Jwt,
    Nanoid,
    Cuid,
    Cuid2,
    Ulid,
    E164,
    Emoji,
    IsoDate,
    IsoTime,
    IsoDateTime,
    IsoDuration,
}

impl StringFormat {
    /// The format label reported in `invalid_format` issues.
    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Guid => "guid",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::Cidrv4 => "cidrv4",
            StringFormat::Cidrv6 => "cidrv6",
            StringFormat::Base64 => "base64",
            StringFormat::Base64Url => "base64url",
            StringFormat::Jwt => "jwt",
            StringFormat::Nanoid => "nanoid",
            StringFormat::Cuid => "cuid",
            StringFormat::Cuid2 => "cuid2",
            StringFormat::Ulid => "ulid",
            StringFormat::E164 => "e164",
            StringFormat::Emoji => "emoji",
            StringFormat::IsoDate => "date",
            StringFormat::IsoTime => "time",
            StringFormat::IsoDateTime => "datetime",
            StringFormat::IsoDuration => "duration",
        }
    }

    pub fn pattern(&self) -> &'static Regex {
        match self {
            StringFormat::Email => &EMAIL,
            StringFormat::Url => &URL,
            StringFormat::Uuid => &UUID,
            StringFormat::Guid => &GUID,
            StringFormat::Ipv4 => &IPV4_RE,
            StringFormat::Ipv6 => &IPV6_RE,
            StringFormat::Cidrv4 => &CIDRV4,
            StringFormat::Cidrv6 => &CIDRV6,
            StringFormat::Base64 => &BASE64,
            StringFormat::Base64Url => &BASE64URL,
            StringFormat::Jwt => &JWT,
            StringFormat::Nanoid => &NANOID,
            StringFormat::Cuid => &CUID,
            StringFormat::Cuid2 => &CUID2,
            StringFormat::Ulid => &ULID,
            StringFormat::E164 => &E164,
            StringFormat::Emoji => &EMOJI,
            StringFormat::IsoDate => &ISO_DATE,
            StringFormat::IsoTime => &ISO_TIME,
            StringFormat::IsoDateTime => &ISO_DATETIME,
            StringFormat::IsoDuration => &ISO_DURATION,
        }
    }

    pub fn matches(&self, s: &str) -> bool {
        if !self.pattern().is_match(s) {
            return false;
        }
        match self {
            StringFormat::Ipv4 => Ipv4Addr::from_str(s).is_ok(),
            StringFormat::Ipv6 => Ipv6Addr::from_str(s).is_ok(),
            StringFormat::Cidrv6 => s
                .split_once('/')
                .is_some_and(|(addr, _)| Ipv6Addr::from_str(addr).is_ok()),
            StringFormat::IsoDuration => s != "P" && !s.ends_with('T'),
            _ => true,
        }
    }
}

/// A format check attached at index 0 of a string-format node.
pub struct FormatCheck {
    format: StringFormat,
    params: CheckParams,
}

impl FormatCheck {
    pub fn new(format: StringFormat, params: CheckParams) -> Self {
        Self { format, params }
    }

    pub fn format(&self) -> StringFormat {
        self.format
    }
}

impl Check for FormatCheck {
    fn name(&self) -> &'static str {
        self.format.name()
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        if let Value::String(s) = &payload.value {
            if !self.format.matches(s) {
                let issue = RawIssue::new(
                    IssueKind::InvalidFormat {
                        format: self.format.name().to_string(),
                        pattern: Some(self.format.pattern().as_str().to_string()),
                    },
                    payload.value.clone(),
                );
                payload.push(self.params.apply(issue));
            }
        }
        CheckStep::Done
    }

    fn on_attach(&self, computed: &mut Computed) {
        computed.format = Some(self.format.name().to_string());
        computed.patterns.push(self.format.pattern().clone());
    }
}
