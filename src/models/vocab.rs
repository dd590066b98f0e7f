//! Closed vocabularies shared by the filter UI and the backend.
//!
//! Every enum maps totally onto its backend value. Parsing accepts the UI
//! label, the backend value, or a listed alias, compared after
//! [`normalize_token`]; anything else is an [`SearchError::UnknownLabel`].

use super::normalize_token;
use crate::error::{Result, SearchError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => $backend:literal, $label:literal $(, [$($alias:literal),*])? ; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// Value the backend stores and accepts
            pub fn backend_value(&self) -> &'static str {
                match self {
                    $( $name::$variant => $backend, )+
                }
            }

            /// Label shown in the filter UI
            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Extra spellings accepted by [`Self::from_label`], already normalized
            pub fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $( $name::$variant => &[ $( $( $alias, )* )? ], )+
                }
            }

            pub fn from_label(raw: &str) -> Result<Self> {
                let token = normalize_token(raw);
                $(
                    if token == $backend
                        || token == normalize_token($label)
                        $( $( || token == $alias )* )?
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(SearchError::unknown_label($kind, raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = SearchError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_label(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.backend_value())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_label(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

vocabulary! {
    /// Category of a property
    PropertyType, "property type" {
        Apartment => "apartment", "Apartment", ["flat"];
        IndependentHouse => "independent_house", "Independent House", ["house"];
        Villa => "villa", "Villa";
        BuilderFloor => "builder_floor", "Builder Floor";
        Penthouse => "penthouse", "Penthouse";
        Studio => "studio", "Studio";
        FarmHouse => "farm_house", "Farm House", ["farmhouse"];
        Plot => "plot", "Plot", ["land_plot"];
        Land => "land", "Land";
        PgHostel => "pg_hostel", "PG Hostel", ["pg", "hostel"];
        Flatmates => "flatmates", "Flatmates", ["flatmate"];
        Commercial => "commercial", "Commercial";
        Office => "office", "Office", ["office_space"];
        Shop => "shop", "Shop", ["retail"];
        Warehouse => "warehouse", "Warehouse", ["godown"];
        Showroom => "showroom", "Showroom";
    }
}

impl PropertyType {
    /// Shown on the commercial tab regardless of sale or rent
    pub fn is_commercial(&self) -> bool {
        matches!(
            self,
            PropertyType::Commercial
                | PropertyType::Office
                | PropertyType::Shop
                | PropertyType::Warehouse
                | PropertyType::Showroom
        )
    }

    /// Priced per month and sized in rooms rather than square feet
    pub fn is_pg(&self) -> bool {
        matches!(self, PropertyType::PgHostel)
    }
}

vocabulary! {
    /// Bedroom configuration
    BhkType, "BHK" {
        OneRk => "1rk", "1 RK", ["1_rk"];
        One => "1bhk", "1 BHK", ["1_bhk"];
        Two => "2bhk", "2 BHK", ["2_bhk"];
        Three => "3bhk", "3 BHK", ["3_bhk"];
        Four => "4bhk", "4 BHK", ["4_bhk"];
        FivePlus => "5bhk_plus", "5+ BHK", ["5+bhk", "5bhk", "5_bhk"];
    }
}

impl BhkType {
    /// Bedrooms implied by the configuration; a 1 RK counts as one
    pub fn bedrooms(&self) -> u32 {
        match self {
            BhkType::OneRk | BhkType::One => 1,
            BhkType::Two => 2,
            BhkType::Three => 3,
            BhkType::Four => 4,
            BhkType::FivePlus => 5,
        }
    }
}

vocabulary! {
    Furnishing, "furnishing" {
        Furnished => "furnished", "Furnished", ["fully_furnished"];
        SemiFurnished => "semi_furnished", "Semi Furnished", ["semi"];
        Unfurnished => "unfurnished", "Unfurnished";
    }
}

vocabulary! {
    /// When the property can be occupied
    Availability, "availability" {
        Immediate => "immediate", "Immediate", ["ready_to_move"];
        Within15Days => "within_15_days", "Within 15 Days";
        Within30Days => "within_30_days", "Within 30 Days";
        After30Days => "after_30_days", "After 30 Days";
    }
}

vocabulary! {
    /// Age of construction, sent as `ageOfProperty`
    PropertyAge, "property age" {
        UnderConstruction => "under_construction", "Under Construction";
        LessThan1Year => "less_than_1_year", "Less than 1 Year", ["0_1_years"];
        OneToFiveYears => "1_to_5_years", "1 to 5 Years", ["1_5_years"];
        FiveToTenYears => "5_to_10_years", "5 to 10 Years", ["5_10_years"];
        MoreThan10Years => "more_than_10_years", "More than 10 Years", ["10+_years"];
    }
}

vocabulary! {
    SortBy, "sort order" {
        Relevance => "relevance", "Relevance";
        Newest => "newest", "Newest First";
        PriceLowToHigh => "price_asc", "Price Low to High", ["price_low_to_high"];
        PriceHighToLow => "price_desc", "Price High to Low", ["price_high_to_low"];
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Relevance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_accepts_ui_and_backend_forms() {
        assert_eq!(PropertyType::from_label("PG HOSTEL").unwrap(), PropertyType::PgHostel);
        assert_eq!(PropertyType::from_label("pg_hostel").unwrap(), PropertyType::PgHostel);
        assert_eq!(PropertyType::from_label("PG/Hostel").unwrap(), PropertyType::PgHostel);
        assert_eq!(PropertyType::from_label("INDEPENDENT HOUSE").unwrap(), PropertyType::IndependentHouse);
        assert_eq!(PropertyType::PgHostel.backend_value(), "pg_hostel");
    }

    #[test]
    fn test_unknown_label_fails_loudly() {
        let err = PropertyType::from_label("Castle").unwrap_err();
        assert!(matches!(err, SearchError::UnknownLabel { kind: "property type", .. }));
    }

    #[test]
    fn test_every_variant_round_trips_its_label() {
        for kind in PropertyType::ALL {
            assert_eq!(PropertyType::from_label(kind.label()).unwrap(), *kind);
        }
        for bhk in BhkType::ALL {
            assert_eq!(BhkType::from_label(bhk.label()).unwrap(), *bhk);
        }
        for age in PropertyAge::ALL {
            assert_eq!(PropertyAge::from_label(age.backend_value()).unwrap(), *age);
        }
    }

    #[test]
    fn test_commercial_kinds() {
        let commercial: Vec<_> = PropertyType::ALL.iter().filter(|t| t.is_commercial()).collect();
        assert_eq!(commercial.len(), 5);
        assert!(!PropertyType::Apartment.is_commercial());
    }

    #[test]
    fn test_bhk_labels() {
        assert_eq!(BhkType::from_label("5+ BHK").unwrap(), BhkType::FivePlus);
        assert_eq!(BhkType::from_label("2bhk").unwrap(), BhkType::Two);
        assert_eq!(BhkType::from_label("1 RK").unwrap().bedrooms(), 1);
    }

    #[test]
    fn test_serde_uses_backend_value() {
        let json = serde_json::to_string(&Furnishing::SemiFurnished).unwrap();
        assert_eq!(json, "\"semi_furnished\"");
        let parsed: Furnishing = serde_json::from_str("\"Semi Furnished\"").unwrap();
        assert_eq!(parsed, Furnishing::SemiFurnished);
    }

    #[test]
    fn test_aliases_parse_back_to_their_variant() {
        assert_eq!(PropertyType::PgHostel.aliases(), &["pg", "hostel"]);
        assert!(PropertyType::Villa.aliases().is_empty());
        assert!(SortBy::Newest.aliases().is_empty());
        assert_eq!(SortBy::from_label("Newest First").unwrap(), SortBy::Newest);
        for kind in PropertyType::ALL {
            for alias in kind.aliases() {
                assert_eq!(PropertyType::from_label(alias).unwrap(), *kind);
                assert_ne!(*alias, kind.backend_value());
            }
        }
    }
}
