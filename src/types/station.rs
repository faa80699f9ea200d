//! Station identifiers and the station sets used by the reports.

use crate::fetch::error::FetchError;
use std::collections::BTreeMap;
use std::fmt;

/// Region assigned to stations missing from a supplied station → region map.
pub const UNASSIGNED_REGION: &str = "unassigned";

/// A validated ASOS station code: one to four ASCII digits (e.g. "108").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(String);

impl StationId {
    pub fn new(code: &str) -> Result<Self, FetchError> {
        let code = code.trim();
        let well_formed =
            !code.is_empty() && code.len() <= 4 && code.bytes().all(|b| b.is_ascii_digit());
        if well_formed {
            Ok(Self(code.to_string()))
        } else {
            Err(FetchError::InvalidStation(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fixed observation point with its display name and province.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Station {
    pub code: &'static str,
    pub name: &'static str,
    pub region: &'static str,
}

/// The seventeen representative stations used for national reports.
pub const REPRESENTATIVE_STATIONS: [Station; 17] = [
    Station { code: "90", name: "속초", region: "강원" },
    Station { code: "101", name: "춘천", region: "강원" },
    Station { code: "105", name: "강릉", region: "강원" },
    Station { code: "108", name: "서울", region: "서울" },
    Station { code: "112", name: "인천", region: "인천" },
    Station { code: "119", name: "수원", region: "경기" },
    Station { code: "127", name: "충주", region: "충북" },
    Station { code: "131", name: "청주", region: "충북" },
    Station { code: "133", name: "대전", region: "대전" },
    Station { code: "136", name: "안동", region: "경북" },
    Station { code: "143", name: "대구", region: "대구" },
    Station { code: "146", name: "전주", region: "전북" },
    Station { code: "156", name: "광주", region: "광주" },
    Station { code: "159", name: "부산", region: "부산" },
    Station { code: "165", name: "목포", region: "전남" },
    Station { code: "184", name: "제주", region: "제주" },
    Station { code: "239", name: "세종", region: "세종" },
];

pub fn representative_station_codes() -> Vec<String> {
    REPRESENTATIVE_STATIONS
        .iter()
        .map(|s| s.code.to_string())
        .collect()
}

/// Station → region map for the Gyeonggi and Sejong regional daily report.
pub fn gyeonggi_sejong_regions() -> BTreeMap<String, String> {
    [
        ("98", "경기"),
        ("99", "경기"),
        ("119", "경기"),
        ("202", "경기"),
        ("203", "경기"),
        ("239", "세종"),
    ]
    .into_iter()
    .map(|(code, region)| (code.to_string(), region.to_string()))
    .collect()
}

/// Station → region map for all representative stations.
pub fn representative_regions() -> BTreeMap<String, String> {
    REPRESENTATIVE_STATIONS
        .iter()
        .map(|s| (s.code.to_string(), s.region.to_string()))
        .collect()
}
