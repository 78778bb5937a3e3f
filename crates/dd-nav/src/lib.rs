//! Navigation state passed explicitly into overlay resolution.

use dd_core::DrillError;
use dd_core::DrillResult;
use url::Url;

/// Location schemes a hosted document can be displayed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::File => "file",
        }
    }
}

/// Snapshot of the current navigation location.
///
/// Unlike a network URL the fragment is the interesting part here: it names the
/// element the viewer has drilled into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    href: Option<Url>,
    hash: String,
}

impl Location {
    /// Parses a full document URL such as `https://host/diagram.svg#g2`.
    pub fn parse(input: &str) -> DrillResult<Self> {
        let parsed = Url::parse(input).map_err(|error| {
            DrillError::new(
                "nav.url.invalid",
                format!("failed to parse URL `{input}`: {error}"),
            )
        })?;

        match parsed.scheme() {
            "http" | "https" | "file" => {}
            other => {
                return Err(DrillError::new(
                    "nav.url.scheme_unsupported",
                    format!("unsupported scheme `{other}`"),
                ));
            }
        }

        let hash = match parsed.fragment() {
            Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
            _ => String::new(),
        };

        Ok(Self {
            href: Some(parsed),
            hash,
        })
    }

    /// Builds a location from a bare hash component (`"#g2"`, `"g2"` or `""`).
    pub fn from_hash(hash: &str) -> Self {
        let hash = match hash.strip_prefix('#') {
            Some("") => String::new(),
            Some(_) => hash.to_owned(),
            None if hash.is_empty() => String::new(),
            None => format!("#{hash}"),
        };

        Self { href: None, hash }
    }

    /// Accepts either a full URL or a bare hash, the two forms hosts hand over.
    pub fn from_input(input: &str) -> DrillResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Self::from_hash(trimmed));
        }
        Self::parse(trimmed)
    }

    pub fn scheme(&self) -> Option<Scheme> {
        match self.href.as_ref()?.scheme() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            _ => None,
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_ref().map(Url::as_str)
    }

    /// Hash component including the leading `#`, or empty when there is none.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Element id named by the fragment: the hash without its leading `#`, taken
    /// verbatim. Empty when there is none.
    pub fn fragment_id(&self) -> &str {
        self.hash.strip_prefix('#').unwrap_or(&self.hash)
    }
}

/// Host events that should re-run overlay resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationEvent {
    /// Initial page display, including restores from the back-forward cache.
    PageShow,
    HashChange,
    /// History back/forward.
    PopState,
}

impl NavigationEvent {
    pub const ALL: [Self; 3] = [Self::PageShow, Self::HashChange, Self::PopState];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageShow => "pageshow",
            Self::HashChange => "hashchange",
            Self::PopState => "popstate",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pageshow" => Some(Self::PageShow),
            "hashchange" => Some(Self::HashChange),
            "popstate" => Some(Self::PopState),
            _ => None,
        }
    }
}
