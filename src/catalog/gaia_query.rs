//! # Gaia archive query
//!
//! Synchronous TAP (`/tap/sync`) query against the ESA Gaia archive, returning a random
//! sample of DR3 sources as CSV.
//!
//! The query is an ADQL `SELECT TOP n … ORDER BY random_index`: `random_index` is a
//! random permutation of the catalog stored as a column, so the first `n` rows in that
//! order are a uniform random sample. Adding `random_index >= offset` selects another,
//! equally random and reproducible, sample.
//!
//! ```text
//! SELECT TOP 1000 source_id, ra, dec, parallax, pmra, pmdec, radial_velocity
//! FROM gaiadr3.gaia_source
//! WHERE parallax > 0 AND radial_velocity IS NOT NULL
//! ORDER BY random_index
//! ```
//!
//! No retry is attempted: a failed request aborts the run.
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use itertools::Itertools;
use regex::Regex;

use super::{parse_catalog_csv, CatalogSource, RawCatalogRow, CATALOG_COLUMNS};
use crate::env_state::Gaia3dEnv;
use crate::gaia3d_errors::Gaia3dError;

/// Synchronous TAP endpoint of the ESA Gaia archive.
pub const GAIA_TAP_SYNC: &str = "https://gea.esac.esa.int/tap-server/tap/sync";

/// Gaia DR3 main source table.
pub const GAIA_DR3_SOURCE_TABLE: &str = "gaiadr3.gaia_source";

static VOTABLE_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<INFO[^>]*value="ERROR"[^>]*>(.*?)</INFO>"#)
        .expect("VOTable error regex is valid")
});

/// Parameters of the catalog query.
///
/// Defaults
/// -----------------
/// * `sample_size`: 1000
/// * `random_index_offset`: `None` (start of the random permutation)
/// * `require_radial_velocity`: `true`
/// * `endpoint`: [`GAIA_TAP_SYNC`]
/// * `table`: [`GAIA_DR3_SOURCE_TABLE`]
/// * `timeout`: 60 s
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub sample_size: usize,
    pub random_index_offset: Option<u64>,
    /// Push the "valid velocity" constraint to the server.
    pub require_radial_velocity: bool,
    pub endpoint: String,
    pub table: String,
    pub timeout: Duration,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryParamsBuilder {
        QueryParamsBuilder::new()
    }

    /// ADQL text sent to the archive.
    pub fn adql(&self) -> String {
        let mut constraints = vec!["parallax > 0".to_string()];
        if self.require_radial_velocity {
            constraints.push("radial_velocity IS NOT NULL".to_string());
        }
        if let Some(offset) = self.random_index_offset {
            constraints.push(format!("random_index >= {offset}"));
        }

        format!(
            "SELECT TOP {} {} FROM {} WHERE {} ORDER BY random_index",
            self.sample_size,
            CATALOG_COLUMNS.iter().join(", "),
            self.table,
            constraints.iter().join(" AND ")
        )
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            sample_size: 1000,
            random_index_offset: None,
            require_radial_velocity: true,
            endpoint: GAIA_TAP_SYNC.to_string(),
            table: GAIA_DR3_SOURCE_TABLE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QueryParams {{ sample_size: {}, offset: {}, require_rv: {}, table: {}, endpoint: {}, timeout: {}s }}",
            self.sample_size,
            self.random_index_offset
                .map_or_else(|| "none".to_string(), |o| o.to_string()),
            self.require_radial_velocity,
            self.table,
            self.endpoint,
            self.timeout.as_secs_f64()
        )
    }
}

/// Builder for [`QueryParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct QueryParamsBuilder {
    params: QueryParams,
}

impl QueryParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_size(mut self, v: usize) -> Self {
        self.params.sample_size = v;
        self
    }
    pub fn random_index_offset(mut self, v: Option<u64>) -> Self {
        self.params.random_index_offset = v;
        self
    }
    pub fn require_radial_velocity(mut self, v: bool) -> Self {
        self.params.require_radial_velocity = v;
        self
    }
    pub fn endpoint(mut self, v: impl Into<String>) -> Self {
        self.params.endpoint = v.into();
        self
    }
    pub fn table(mut self, v: impl Into<String>) -> Self {
        self.params.table = v.into();
        self
    }
    pub fn timeout(mut self, v: Duration) -> Self {
        self.params.timeout = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `sample_size >= 1`
    /// * `timeout > 0`
    /// * `endpoint` starts with `http://` or `https://`
    /// * `table` is a plain (optionally schema-qualified) identifier
    pub fn build(self) -> Result<QueryParams, Gaia3dError> {
        let p = &self.params;

        if p.sample_size == 0 {
            return Err(Gaia3dError::InvalidParameter(
                "sample_size must be >= 1".into(),
            ));
        }
        if p.timeout.is_zero() {
            return Err(Gaia3dError::InvalidParameter("timeout must be > 0".into()));
        }
        if !(p.endpoint.starts_with("http://") || p.endpoint.starts_with("https://")) {
            return Err(Gaia3dError::InvalidParameter(format!(
                "endpoint must be an http(s) URL, got {}",
                p.endpoint
            )));
        }
        let table_ok = !p.table.is_empty()
            && p
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !table_ok {
            return Err(Gaia3dError::InvalidParameter(format!(
                "invalid table name: {}",
                p.table
            )));
        }

        Ok(self.params)
    }
}

/// Extract the message of a VOTable error document, if `body` is one.
pub(crate) fn votable_error_message(body: &str) -> Option<String> {
    VOTABLE_ERROR
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Gaia archive accessed through [`Gaia3dEnv`].
#[derive(Debug)]
pub struct GaiaArchive<'a> {
    env: &'a Gaia3dEnv,
}

impl<'a> GaiaArchive<'a> {
    pub fn new(env: &'a Gaia3dEnv) -> Self {
        GaiaArchive { env }
    }
}

impl CatalogSource for GaiaArchive<'_> {
    fn fetch_rows(&self, params: &QueryParams) -> Result<Vec<RawCatalogRow>, Gaia3dError> {
        let query = params.adql();
        log::info!("Querying {}", params.endpoint);
        log::debug!("ADQL: {query}");

        let form = [
            ("REQUEST", "doQuery"),
            ("LANG", "ADQL"),
            ("FORMAT", "csv"),
            ("QUERY", query.as_str()),
        ];
        let response = self
            .env
            .post_form(&params.endpoint, &form, params.timeout)?;

        if !response.is_success() {
            let detail = votable_error_message(&response.body)
                .unwrap_or_else(|| response.body.chars().take(200).collect());
            return Err(Gaia3dError::ServiceError(format!(
                "HTTP {}: {detail}",
                response.status
            )));
        }
        // the archive answers some failures with a 200 and a VOTable
        if let Some(message) = votable_error_message(&response.body) {
            return Err(Gaia3dError::ServiceError(message));
        }

        let mut rows = parse_catalog_csv(&response.body)?;
        rows.truncate(params.sample_size);
        log::info!("Fetched {} stars from Gaia", rows.len());
        Ok(rows)
    }

    fn describe(&self) -> String {
        "Gaia DR3 archive (TAP sync)".to_string()
    }
}

#[cfg(test)]
mod gaia_query_test {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    #[test]
    fn test_default_adql() {
        let params = QueryParams::default();
        assert_eq!(
            params.adql(),
            "SELECT TOP 1000 source_id, ra, dec, parallax, pmra, pmdec, radial_velocity \
             FROM gaiadr3.gaia_source WHERE parallax > 0 AND radial_velocity IS NOT NULL \
             ORDER BY random_index"
        );
    }

    #[test]
    fn test_adql_with_offset_and_no_rv_constraint() {
        let params = QueryParams::builder()
            .sample_size(50)
            .random_index_offset(Some(123_456))
            .require_radial_velocity(false)
            .build()
            .unwrap();
        assert_eq!(
            params.adql(),
            "SELECT TOP 50 source_id, ra, dec, parallax, pmra, pmdec, radial_velocity \
             FROM gaiadr3.gaia_source WHERE parallax > 0 AND random_index >= 123456 \
             ORDER BY random_index"
        );
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(
            QueryParams::builder().sample_size(0).build(),
            Err(Gaia3dError::InvalidParameter(
                "sample_size must be >= 1".into()
            ))
        );
        assert!(QueryParams::builder()
            .timeout(Duration::ZERO)
            .build()
            .is_err());
        assert!(QueryParams::builder().endpoint("ftp://x").build().is_err());
        assert!(QueryParams::builder()
            .table("gaia_source; DROP TABLE x")
            .build()
            .is_err());
    }

    #[test]
    fn test_votable_error_message() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="1.4">
<RESOURCE type="results">
<INFO name="QUERY_STATUS" value="ERROR">
Cannot parse query: unknown column "paralax"
</INFO>
</RESOURCE>
</VOTABLE>"#;
        assert_eq!(
            votable_error_message(body).as_deref(),
            Some(r#"Cannot parse query: unknown column "paralax""#)
        );
        assert_eq!(votable_error_message("source_id,ra\n1,2\n"), None);
    }

    #[test]
    fn test_fetch_rows_honours_query_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/tap/sync", listener.local_addr().unwrap());
        let silent = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(3));
            drop(stream);
        });

        let params = QueryParams::builder()
            .endpoint(endpoint)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let env = Gaia3dEnv::new(Duration::from_secs(10)).unwrap();

        let start = Instant::now();
        let err = GaiaArchive::new(&env).fetch_rows(&params).unwrap_err();
        assert!(matches!(err, Gaia3dError::NetworkFailure(_)));
        assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
        silent.join().unwrap();
    }

    /// Serve one canned HTTP response on a local port, after reading the whole request.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/tap/sync", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .to_ascii_lowercase()
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:")?.trim().parse().ok())
                        .unwrap_or(0usize);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        endpoint
    }

    #[test]
    fn test_http_error_status_is_service_error() {
        let body = r#"<VOTABLE><RESOURCE type="results"><INFO name="QUERY_STATUS" value="ERROR">Table not found</INFO></RESOURCE></VOTABLE>"#;
        let endpoint = serve_once("HTTP/1.1 400 Bad Request", body);
        let params = QueryParams::builder().endpoint(endpoint).build().unwrap();
        let env = Gaia3dEnv::new(Duration::from_secs(5)).unwrap();

        let err = GaiaArchive::new(&env).fetch_rows(&params).unwrap_err();
        assert_eq!(err, Gaia3dError::ServiceError("HTTP 400: Table not found".into()));
    }

    #[test]
    #[ignore]
    fn test_gaia_archive_live_query() {
        let params = QueryParams::builder().sample_size(10).build().unwrap();
        let env = Gaia3dEnv::new(params.timeout).unwrap();
        let rows = GaiaArchive::new(&env).fetch_rows(&params).unwrap();
        assert!(rows.len() <= 10);
        assert!(rows.iter().all(|r| r.parallax.unwrap_or(0.0) > 0.0));
    }
}
