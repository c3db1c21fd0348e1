//! Closed-set post filters.
//!
//! Each facet is an enum whose variants map to a literal SQL predicate.
//! Filter values never reach statement text except through these mappings,
//! and parsing rejects anything outside the set.

// Variants are named after their wire values
#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Post media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// No type restriction.
    #[default]
    All,
    Image,
    Animation,
    Video,
    Comic,
    Audio,
    Model,
    Live2d,
}

impl PostType {
    /// Returns the `posts.type` predicate, or `None` for [`PostType::All`].
    pub fn predicate(self) -> Option<String> {
        match self {
            PostType::All => None,
            other => Some(format!("posts.type = '{}'", other)),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostType::All => write!(f, "all"),
            PostType::Image => write!(f, "image"),
            PostType::Animation => write!(f, "animation"),
            PostType::Video => write!(f, "video"),
            PostType::Comic => write!(f, "comic"),
            PostType::Audio => write!(f, "audio"),
            PostType::Model => write!(f, "model"),
            PostType::Live2d => write!(f, "live2d"),
        }
    }
}

impl FromStr for PostType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PostType::All),
            "image" => Ok(PostType::Image),
            "animation" => Ok(PostType::Animation),
            "video" => Ok(PostType::Video),
            "comic" => Ok(PostType::Comic),
            "audio" => Ok(PostType::Audio),
            "model" => Ok(PostType::Model),
            "live2d" => Ok(PostType::Live2d),
            _ => Err(SearchError::InvalidFilter {
                facet: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// Content rating tier.
///
/// `all` widens to every tier below hentai for signed-in users but stays at
/// `cute` for anonymous callers. `all+h` applies no restriction at all; the
/// caller is responsible for checking that the user may see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "cute")]
    Cute,
    #[serde(rename = "sexy")]
    Sexy,
    #[serde(rename = "ecchi")]
    Ecchi,
    #[serde(rename = "hentai")]
    Hentai,
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "all+h")]
    AllH,
}

impl Rating {
    /// Returns the rating predicate against `{table}.rating`.
    pub fn predicate(self, table: &str, signed_in: bool) -> Option<String> {
        match self {
            Rating::Cute | Rating::Sexy | Rating::Ecchi | Rating::Hentai => {
                Some(format!("{table}.rating = '{self}'"))
            }
            Rating::All if !signed_in => Some(format!("{table}.rating = 'cute'")),
            Rating::All => Some(format!(
                "({table}.rating = 'cute' OR {table}.rating = 'sexy' OR {table}.rating = 'ecchi')"
            )),
            Rating::AllH => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Cute => write!(f, "cute"),
            Rating::Sexy => write!(f, "sexy"),
            Rating::Ecchi => write!(f, "ecchi"),
            Rating::Hentai => write!(f, "hentai"),
            Rating::All => write!(f, "all"),
            Rating::AllH => write!(f, "all+h"),
        }
    }
}

impl FromStr for Rating {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cute" => Ok(Rating::Cute),
            "sexy" => Ok(Rating::Sexy),
            "ecchi" => Ok(Rating::Ecchi),
            "hentai" => Ok(Rating::Hentai),
            "all" => Ok(Rating::All),
            "all+h" => Ok(Rating::AllH),
            _ => Err(SearchError::InvalidFilter {
                facet: "rating",
                value: s.to_string(),
            }),
        }
    }
}

/// Art style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "pixel")]
    Pixel,
    #[serde(rename = "chibi")]
    Chibi,
    #[serde(rename = "daki")]
    Daki,
    #[serde(rename = "sketch")]
    Sketch,
    #[serde(rename = "lineart")]
    Lineart,
    #[serde(rename = "promo")]
    Promo,
    /// Everything except sketches and lineart.
    #[default]
    #[serde(rename = "all")]
    All,
    /// No style restriction.
    #[serde(rename = "all+s")]
    AllS,
}

impl Style {
    /// Returns the `posts.style` predicate.
    pub fn predicate(self) -> Option<String> {
        match self {
            // stored casing varies for these two
            Style::TwoD | Style::ThreeD => Some(format!("lower(posts.style) = '{self}'")),
            Style::Pixel
            | Style::Chibi
            | Style::Daki
            | Style::Sketch
            | Style::Lineart
            | Style::Promo => Some(format!("posts.style = '{self}'")),
            Style::All => {
                Some("NOT (posts.style = 'sketch' OR posts.style = 'lineart')".to_string())
            }
            Style::AllS => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::TwoD => write!(f, "2d"),
            Style::ThreeD => write!(f, "3d"),
            Style::Pixel => write!(f, "pixel"),
            Style::Chibi => write!(f, "chibi"),
            Style::Daki => write!(f, "daki"),
            Style::Sketch => write!(f, "sketch"),
            Style::Lineart => write!(f, "lineart"),
            Style::Promo => write!(f, "promo"),
            Style::All => write!(f, "all"),
            Style::AllS => write!(f, "all+s"),
        }
    }
}

impl FromStr for Style {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2d" => Ok(Style::TwoD),
            "3d" => Ok(Style::ThreeD),
            "pixel" => Ok(Style::Pixel),
            "chibi" => Ok(Style::Chibi),
            "daki" => Ok(Style::Daki),
            "sketch" => Ok(Style::Sketch),
            "lineart" => Ok(Style::Lineart),
            "promo" => Ok(Style::Promo),
            "all" => Ok(Style::All),
            "all+s" => Ok(Style::AllS),
            _ => Err(SearchError::InvalidFilter {
                facet: "style",
                value: s.to_string(),
            }),
        }
    }
}

/// Tag category browsed by the category pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Artists,
    Characters,
    Series,
}

impl TagCategory {
    /// The `tags.type` value stored for this category.
    pub fn tag_type(self) -> &'static str {
        match self {
            TagCategory::Artists => "artist",
            TagCategory::Characters => "character",
            TagCategory::Series => "series",
        }
    }

    /// Returns the `tags.type` predicate.
    pub fn predicate(self) -> String {
        format!("tags.type = '{}'", self.tag_type())
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagCategory::Artists => write!(f, "artists"),
            TagCategory::Characters => write!(f, "characters"),
            TagCategory::Series => write!(f, "series"),
        }
    }
}

impl FromStr for TagCategory {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artists" => Ok(TagCategory::Artists),
            "characters" => Ok(TagCategory::Characters),
            "series" => Ok(TagCategory::Series),
            _ => Err(SearchError::InvalidFilter {
                facet: "category",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicates() {
        assert_eq!(PostType::All.predicate(), None);
        assert_eq!(
            PostType::Live2d.predicate().as_deref(),
            Some("posts.type = 'live2d'")
        );
        assert_eq!(
            PostType::Image.predicate().as_deref(),
            Some("posts.type = 'image'")
        );
    }

    #[test]
    fn test_rating_all_anonymous_is_cute_only() {
        assert_eq!(
            Rating::All.predicate("posts", false).as_deref(),
            Some("posts.rating = 'cute'")
        );
    }

    #[test]
    fn test_rating_all_signed_in() {
        assert_eq!(
            Rating::All.predicate("posts", true).as_deref(),
            Some("(posts.rating = 'cute' OR posts.rating = 'sexy' OR posts.rating = 'ecchi')")
        );
    }

    #[test]
    fn test_rating_all_h_has_no_predicate() {
        assert_eq!(Rating::AllH.predicate("posts", false), None);
        assert_eq!(Rating::AllH.predicate("posts", true), None);
    }

    #[test]
    fn test_rating_table_qualifier() {
        assert_eq!(
            Rating::Hentai.predicate("groups", true).as_deref(),
            Some("groups.rating = 'hentai'")
        );
    }

    #[test]
    fn test_style_predicates() {
        assert_eq!(
            Style::TwoD.predicate().as_deref(),
            Some("lower(posts.style) = '2d'")
        );
        assert_eq!(
            Style::Chibi.predicate().as_deref(),
            Some("posts.style = 'chibi'")
        );
        assert_eq!(
            Style::All.predicate().as_deref(),
            Some("NOT (posts.style = 'sketch' OR posts.style = 'lineart')")
        );
        assert_eq!(Style::AllS.predicate(), None);
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for rating in ["cute", "sexy", "ecchi", "hentai", "all", "all+h"] {
            assert_eq!(rating.parse::<Rating>().unwrap().to_string(), rating);
        }
        for style in ["2d", "3d", "pixel", "all+s"] {
            assert_eq!(style.parse::<Style>().unwrap().to_string(), style);
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = "spicy".parse::<Rating>().unwrap_err();
        assert_eq!(
            err,
            SearchError::InvalidFilter {
                facet: "rating",
                value: "spicy".to_string()
            }
        );
        assert!("gif".parse::<PostType>().is_err());
        assert!("watercolor".parse::<Style>().is_err());
        assert!("tags".parse::<TagCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Rating::AllH).unwrap(), r#""all+h""#);
        assert_eq!(serde_json::to_string(&Style::ThreeD).unwrap(), r#""3d""#);
        let style: Style = serde_json::from_str(r#""all+s""#).unwrap();
        assert_eq!(style, Style::AllS);
        assert!(serde_json::from_str::<Rating>(r#""spicy""#).is_err());
    }

    #[test]
    fn test_tag_category_types() {
        assert_eq!(TagCategory::Artists.predicate(), "tags.type = 'artist'");
        assert_eq!(TagCategory::Characters.tag_type(), "character");
        assert_eq!(TagCategory::Series.tag_type(), "series");
    }
}
