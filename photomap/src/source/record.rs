//! Raw upstream photo records and the rules for mapping them.

use serde::{Deserialize, Deserializer};

use crate::coord::{CoordError, Coordinate};
use crate::marker::Observation;

/// Who may see a photo's location upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoPrivacy {
    Public = 1,
    Contacts = 2,
    Friends = 3,
    Family = 4,
    FriendsAndFamily = 5,
    Private = 6,
}

impl GeoPrivacy {
    /// Parse a numeric level (1-6). Returns `None` for anything else.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Public),
            2 => Some(Self::Contacts),
            3 => Some(Self::Friends),
            4 => Some(Self::Family),
            5 => Some(Self::FriendsAndFamily),
            6 => Some(Self::Private),
            _ => None,
        }
    }

    /// Numeric level (1-6).
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

/// One photo as exported by the upstream photo service.
///
/// Numeric fields are accepted either as JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    /// Small square thumbnail URL.
    #[serde(alias = "url_sq", default)]
    pub thumbnail: String,
    #[serde(deserialize_with = "number", default)]
    pub latitude: f64,
    #[serde(deserialize_with = "number", default)]
    pub longitude: f64,
    /// Upstream location accuracy (0 when the photo has no location).
    #[serde(deserialize_with = "number", default)]
    pub accuracy: f64,
    #[serde(deserialize_with = "flag", default)]
    pub geo_is_public: bool,
    #[serde(deserialize_with = "flag", default)]
    pub geo_is_contact: bool,
    #[serde(deserialize_with = "flag", default)]
    pub geo_is_friend: bool,
    #[serde(deserialize_with = "flag", default)]
    pub geo_is_family: bool,
    /// Space separated, lower-case tags.
    #[serde(default)]
    pub tags: String,
}

impl PhotoRecord {
    /// Create a public, geotagged record.
    pub fn new(id: impl Into<String>, thumbnail: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            thumbnail: thumbnail.into(),
            latitude: lat,
            longitude: lon,
            accuracy: 16.0,
            geo_is_public: true,
            geo_is_contact: false,
            geo_is_friend: false,
            geo_is_family: false,
            tags: String::new(),
        }
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Returns true unless the upstream location is the all-zero placeholder.
    pub fn is_geotagged(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0 && self.accuracy == 0.0)
    }

    /// Location visibility derived from the upstream flags.
    pub fn geo_privacy(&self) -> GeoPrivacy {
        if self.geo_is_public {
            return GeoPrivacy::Public;
        }
        if self.geo_is_contact {
            return GeoPrivacy::Contacts;
        }
        match (self.geo_is_friend, self.geo_is_family) {
            (true, false) => GeoPrivacy::Friends,
            (false, true) => GeoPrivacy::Family,
            (true, true) => GeoPrivacy::FriendsAndFamily,
            (false, false) => GeoPrivacy::Private,
        }
    }

    /// Returns true if `tag` is among the photo's tags (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .split_whitespace()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Convert into an observation.
    pub fn to_observation(&self) -> Result<Observation, CoordError> {
        let coordinate = Coordinate::new(self.longitude, self.latitude)?;
        Ok(Observation::new(self.id.clone(), self.thumbnail.clone(), coordinate))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) if s.trim().is_empty() => Ok(0.0),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Other(NumberOrString),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Other(NumberOrString::Number(n)) => n != 0.0,
        Flag::Other(NumberOrString::Text(s)) => s.trim() == "1",
    })
}

/// Which records are put on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    /// Required location visibility; `None` accepts any.
    pub geo_privacy: Option<GeoPrivacy>,
    /// Records carrying this tag are left off the map.
    pub exclude_tag: Option<String>,
}

/// Why records were left off the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub accepted: usize,
    pub not_geotagged: usize,
    pub privacy_mismatch: usize,
    pub excluded_by_tag: usize,
    pub invalid_coordinate: usize,
}

impl FilterReport {
    /// Records left off the map for any reason.
    pub fn skipped(&self) -> usize {
        self.not_geotagged + self.privacy_mismatch + self.excluded_by_tag + self.invalid_coordinate
    }
}

impl ObservationFilter {
    /// Require a location visibility.
    pub fn with_geo_privacy(mut self, privacy: Option<GeoPrivacy>) -> Self {
        self.geo_privacy = privacy;
        self
    }

    /// Exclude records tagged `tag`. A blank tag excludes nothing.
    pub fn with_exclude_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into().trim().to_string();
        self.exclude_tag = (!tag.is_empty()).then_some(tag);
        self
    }

    /// Convert the mappable records into observations, keeping their order.
    pub fn apply<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PhotoRecord>,
    ) -> (Vec<Observation>, FilterReport) {
        let mut report = FilterReport::default();
        let mut observations = Vec::new();

        for record in records {
            if !record.is_geotagged() {
                report.not_geotagged += 1;
                continue;
            }
            if self
                .geo_privacy
                .is_some_and(|wanted| record.geo_privacy() != wanted)
            {
                report.privacy_mismatch += 1;
                continue;
            }
            if self
                .exclude_tag
                .as_deref()
                .is_some_and(|tag| record.has_tag(tag))
            {
                report.excluded_by_tag += 1;
                continue;
            }
            match record.to_observation() {
                Ok(observation) => {
                    report.accepted += 1;
                    observations.push(observation);
                }
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Skipping photo with invalid location");
                    report.invalid_coordinate += 1;
                }
            }
        }

        (observations, report)
    }
}
