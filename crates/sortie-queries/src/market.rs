//! Country → market code mapping for suggestion lookups.

use std::fmt;

use sortie_settings::SortieSettings;

/// Market code used for countries outside the table.
pub const DEFAULT_MARKET: &str = "en-US";

const MARKETS: &[(&str, &str)] = &[
    ("ES", "es-ES"),
    ("US", "en-US"),
    ("FR", "fr-FR"),
    ("DE", "de-DE"),
    ("IT", "it-IT"),
];

/// A search market: the account country plus its suggestion market code.
///
/// The country doubles as the geo for trending-topic lookups; the market
/// code keys autosuggest requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Market {
    country: String,
    code: &'static str,
}

impl Market {
    /// Map a two-letter country code. Unmapped countries keep their geo but
    /// use [`DEFAULT_MARKET`].
    pub fn from_country(country: &str) -> Self {
        let country = country.trim().to_uppercase();
        let code = MARKETS
            .iter()
            .find(|(c, _)| *c == country)
            .map_or(DEFAULT_MARKET, |(_, code)| code);
        Self { country, code }
    }

    /// Resolve the market for an account.
    ///
    /// With geo queries off, or when the account has no country, the
    /// fallback country is used.
    pub fn resolve(country: Option<&str>, use_geo_locale: bool, fallback: &str) -> Self {
        match country.filter(|c| use_geo_locale && !c.trim().is_empty()) {
            Some(country) => Self::from_country(country),
            None => Self::from_country(fallback),
        }
    }

    /// [`resolve`](Self::resolve) with the geo toggle
    /// (`search.useGeoLocaleQueries`) and fallback country
    /// (`queries.fallbackCountry`) taken from `settings`.
    pub fn for_account(country: Option<&str>, settings: &SortieSettings) -> Self {
        Self::resolve(
            country,
            settings.search.use_geo_locale_queries,
            &settings.queries.fallback_country,
        )
    }

    /// Upper-case two-letter country (trends geo).
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Suggestion market code, e.g. `fr-FR`.
    pub fn code(&self) -> &str {
        self.code
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_countries() {
        assert_eq!(Market::from_country("FR").code(), "fr-FR");
        assert_eq!(Market::from_country("es").code(), "es-ES");
        assert_eq!(Market::from_country("DE").country(), "DE");
    }

    #[test]
    fn unmapped_country_defaults_to_en_us() {
        let market = Market::from_country("JP");
        assert_eq!(market.code(), DEFAULT_MARKET);
        assert_eq!(market.country(), "JP");
    }

    #[test]
    fn resolve_honors_geo_toggle() {
        assert_eq!(Market::resolve(Some("IT"), true, "US").code(), "it-IT");
        assert_eq!(Market::resolve(Some("IT"), false, "US").code(), "en-US");
        assert_eq!(Market::resolve(None, true, "FR").code(), "fr-FR");
        assert_eq!(Market::resolve(Some(" "), true, "US").country(), "US");
    }

    #[test]
    fn account_market_follows_settings() {
        let mut settings = SortieSettings::default();
        assert_eq!(Market::for_account(Some("FR"), &settings).code(), "fr-FR");

        settings.search.use_geo_locale_queries = false;
        settings.queries.fallback_country = "DE".to_string();
        let market = Market::for_account(Some("FR"), &settings);
        assert_eq!(market.code(), "de-DE");
        assert_eq!(market.country(), "DE");
        assert_eq!(Market::for_account(None, &settings).country(), "DE");
    }
}
