//! Daily program schedules and program-window lookup.
//!
//! Timeshift requests need the exact `[ft, to)` interval of the program that
//! contains the requested instant; the service rejects windows it did not
//! broadcast. The schedule is fetched per civil JST date, scoped to the
//! session area.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, snippet};
use crate::time::{datetime_string, parse_datetime};

#[derive(Debug, Deserialize)]
struct ScheduleXml {
    stations: StationListXml,
}

#[derive(Debug, Default, Deserialize)]
struct StationListXml {
    #[serde(default, rename = "station")]
    stations: Vec<Station>,
}

/// One station's listing for the fetched date.
#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub progs: ProgramList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramList {
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "prog")]
    pub progs: Vec<Program>,
}

/// A single broadcast program. `ft`/`to` are wire-format JST timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    #[serde(rename = "@ft")]
    pub ft: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pfm: String,
}

impl Program {
    /// Parse the program's broadcast interval.
    pub fn window(&self) -> Result<ProgramWindow, Error> {
        Ok(ProgramWindow {
            ft: parse_datetime(&self.ft)?,
            to: parse_datetime(&self.to)?,
        })
    }
}

/// Half-open broadcast interval in JST: an instant equal to `ft` is inside,
/// an instant equal to `to` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramWindow {
    pub ft: DateTime<Tz>,
    pub to: DateTime<Tz>,
}

impl ProgramWindow {
    pub fn contains(&self, at: DateTime<Tz>) -> bool {
        self.ft <= at && at < self.to
    }
}

/// Locate the program whose window contains `at` on the given station.
///
/// Programs with malformed timestamps are skipped rather than failing the
/// whole lookup.
pub fn find_program<'a>(
    stations: &'a [Station],
    station_id: &str,
    at: DateTime<Tz>,
) -> Result<&'a Program, Error> {
    let station = stations
        .iter()
        .find(|s| s.id == station_id)
        .ok_or_else(|| Error::StationNotFound(station_id.to_owned()))?;

    station
        .progs
        .progs
        .iter()
        .find(|prog| prog.window().map(|w| w.contains(at)).unwrap_or(false))
        .ok_or_else(|| Error::ProgramNotFound {
            station: station_id.to_owned(),
            at: datetime_string(at),
        })
}

impl Client {
    /// Program schedule for one civil JST date, scoped to the session area.
    pub async fn date_programs(&self, date: NaiveDate) -> Result<Vec<Station>, Error> {
        let area = self.schedule_area();
        let path = format!("v3/program/date/{}/{area}.xml", date.format("%Y%m%d"));
        let url = self.api_url(&path)?;
        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context: "program schedule",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }

        let schedule: ScheduleXml = quick_xml::de::from_str(&body)?;
        debug!(
            date = %date,
            area,
            stations = schedule.stations.stations.len(),
            "program schedule fetched"
        );
        Ok(schedule.stations.stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_datetime;

    const SCHEDULE: &str = r#"<radiko>
  <stations>
    <station id="LFR">
      <name>ニッポン放送</name>
      <progs>
        <date>20240325</date>
        <prog ft="20240325050000" to="20240325060000">
          <title>morning news</title>
          <pfm>anchor</pfm>
        </prog>
        <prog ft="20240325060000" to="20240325080000">
          <title>wide show</title>
        </prog>
      </progs>
    </station>
  </stations>
</radiko>"#;

    fn stations() -> Vec<Station> {
        let schedule: ScheduleXml = quick_xml::de::from_str(SCHEDULE).unwrap();
        schedule.stations.stations
    }

    #[test]
    fn deserializes_schedule() {
        let stations = stations();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "LFR");
        assert_eq!(stations[0].progs.date, "20240325");
        assert_eq!(stations[0].progs.progs.len(), 2);
        assert_eq!(stations[0].progs.progs[0].title, "morning news");
    }

    #[test]
    fn window_containment_is_half_open() {
        let prog = &stations()[0].progs.progs[0];
        let window = prog.window().unwrap();

        let at_start = parse_datetime("20240325050000").unwrap();
        let inside = parse_datetime("20240325053000").unwrap();
        let at_end = parse_datetime("20240325060000").unwrap();

        assert!(window.contains(at_start));
        assert!(window.contains(inside));
        assert!(!window.contains(at_end));
    }

    #[test]
    fn find_program_selects_containing_window() {
        let stations = stations();
        let at = parse_datetime("20240325063000").unwrap();
        let prog = find_program(&stations, "LFR", at).unwrap();
        assert_eq!(prog.title, "wide show");
    }

    #[test]
    fn find_program_boundary_belongs_to_next_program() {
        let stations = stations();
        let at = parse_datetime("20240325060000").unwrap();
        let prog = find_program(&stations, "LFR", at).unwrap();
        assert_eq!(prog.title, "wide show");
    }

    #[test]
    fn unknown_station_is_an_error() {
        let stations = stations();
        let at = parse_datetime("20240325053000").unwrap();
        assert!(matches!(
            find_program(&stations, "TBS", at),
            Err(Error::StationNotFound(id)) if id == "TBS"
        ));
    }

    #[test]
    fn uncovered_instant_is_an_error() {
        let stations = stations();
        let at = parse_datetime("20240325230000").unwrap();
        assert!(matches!(
            find_program(&stations, "LFR", at),
            Err(Error::ProgramNotFound { .. })
        ));
    }

    #[test]
    fn malformed_program_entries_are_skipped() {
        let xml = r#"<radiko><stations>
          <station id="LFR"><name>n</name><progs>
            <prog ft="garbage" to="garbage"><title>bad</title></prog>
            <prog ft="20240325050000" to="20240325060000"><title>good</title></prog>
          </progs></station>
        </stations></radiko>"#;
        let schedule: ScheduleXml = quick_xml::de::from_str(xml).unwrap();
        let at = parse_datetime("20240325053000").unwrap();
        let prog = find_program(&schedule.stations.stations, "LFR", at).unwrap();
        assert_eq!(prog.title, "good");
    }
}
