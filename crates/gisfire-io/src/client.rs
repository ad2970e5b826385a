use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use gisfire_core::{
    format_utc, DataApi, GisfireError, GisfireResult, LandCover, Lightning, LightningId,
    MeasureKind, Point, Window,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Default spatial reference for coordinates requested from the API
/// (ETRS89 / UTM zone 31N).
pub const DEFAULT_SRID: u32 = 25831;

#[derive(Deserialize)]
struct CountBody {
    count: i64,
}

#[derive(Deserialize)]
struct LandCoverBody {
    land_cover_type: i32,
}

#[derive(Deserialize)]
struct StationBody {
    code: String,
}

#[derive(Deserialize)]
struct MeasureBody {
    value: Option<f64>,
}

/// Blocking client for the gisfire data API.
///
/// One request at a time, no retries and no timeouts. Any status other than
/// 200 is reported as missing data (`Ok(None)`).
pub struct MeteocatClient {
    agent: ureq::Agent,
    /// Base URL without trailing slash, e.g. `https://host/api/v1`
    base_url: String,
    /// Precomputed `Authorization` header value
    authorization: Option<String>,
    srid: u32,
}

impl MeteocatClient {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: host.trim_end_matches('/').to_string(),
            authorization: None,
            srid: DEFAULT_SRID,
        }
    }

    /// Send HTTP basic credentials with every request.
    pub fn with_credentials(mut self, username: &str, token: &str) -> Self {
        let encoded = STANDARD.encode(format!("{username}:{token}"));
        self.authorization = Some(format!("Basic {encoded}"));
        self
    }

    pub fn with_srid(mut self, srid: u32) -> Self {
        self.srid = srid;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GisfireResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.agent.get(&url);
        if let Some(auth) = &self.authorization {
            request = request.set("Authorization", auth);
        }
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) if response.status() == 200 => {
                let body = response
                    .into_json::<T>()
                    .map_err(|e| GisfireError::Parse(format!("decoding {url}: {e}")))?;
                Ok(Some(body))
            }
            Ok(response) => {
                debug!(url = %url, status = response.status(), "treating non-200 answer as missing");
                Ok(None)
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                debug!(url = %url, status, body = %text, "treating error status as missing");
                Ok(None)
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(GisfireError::Http(format!("requesting {url}: {transport}")))
            }
        }
    }

    fn srid_param(&self) -> (&'static str, String) {
        ("srid", self.srid.to_string())
    }
}

impl DataApi for MeteocatClient {
    fn lightning(&self, id: LightningId) -> GisfireResult<Option<Lightning>> {
        self.get_json(&format!("/meteocat/lightning/{id}"), &[self.srid_param()])
    }

    fn lightnings_on(&self, day: NaiveDate) -> GisfireResult<Option<Vec<Lightning>>> {
        let path = format!(
            "/meteocat/lightning/{}/{}/{}",
            day.year(),
            day.month(),
            day.day()
        );
        self.get_json(&path, &[self.srid_param()])
    }

    fn discharge_count(&self, id: LightningId) -> GisfireResult<Option<i64>> {
        let body: Option<CountBody> = self.get_json(
            &format!("/meteocat/lightning/discharge_count/{id}"),
            &[self.srid_param()],
        )?;
        Ok(body.map(|b| b.count))
    }

    fn land_cover(&self, id: LightningId) -> GisfireResult<Option<LandCover>> {
        let body: Option<LandCoverBody> =
            self.get_json(&format!("/meteocat/lightning/land_cover/{id}"), &[])?;
        Ok(body.map(|b| LandCover::new(b.land_cover_type)))
    }

    fn nearest_station(
        &self,
        date: DateTime<Utc>,
        location: Point,
    ) -> GisfireResult<Option<String>> {
        let body: Option<StationBody> = self.get_json(
            "/meteocat/station/nearest",
            &[
                ("date", format_utc(&date)),
                ("x", location.x.to_string()),
                ("y", location.y.to_string()),
                self.srid_param(),
            ],
        )?;
        Ok(body.map(|b| b.code))
    }

    fn measure(
        &self,
        station: &str,
        kind: MeasureKind,
        window: Window,
        date: DateTime<Utc>,
    ) -> GisfireResult<Option<f64>> {
        let path = format!("/meteocat/data/measure/{station}/{}", kind.code());
        let mut query = vec![("date", format_utc(&date))];
        if !window.is_instant() {
            query.push((
                "operation",
                format!("{},{}", kind.aggregation().as_str(), window.days()),
            ));
        }
        let body: Option<MeasureBody> = self.get_json(&path, &query)?;
        Ok(body.and_then(|b| b.value))
    }
}
