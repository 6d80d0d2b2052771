//! XML wire format of the `annualavg` endpoint.
//!
//! ```xml
//! <list>
//!   <domain.web.AnnualGcmDatum>
//!     <gcm>bccr_bcm2_0</gcm>
//!     <variable>pr</variable>
//!     <fromYear>1980</fromYear>
//!     <toYear>1999</toYear>
//!     <annualData>
//!       <double>988.8454972331014</double>
//!     </annualData>
//!   </domain.web.AnnualGcmDatum>
//! </list>
//! ```

use quick_xml::{Reader, events::Event};
use serde::{Deserialize, Serialize};

use crate::{
    error::ClimateError,
    model::{ClimateDataList, ClimateDataPoint},
};

const ROOT: &str = "list";
const RAINFALL_VARIABLE: &str = "pr";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireList {
    #[serde(rename = "domain.web.AnnualGcmDatum", default)]
    data: Vec<WireDatum>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireDatum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gcm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variable: Option<String>,
    #[serde(rename = "fromYear", default, skip_serializing_if = "Option::is_none")]
    from_year: Option<i64>,
    #[serde(rename = "toYear", default, skip_serializing_if = "Option::is_none")]
    to_year: Option<i64>,
    #[serde(rename = "annualData")]
    annual_data: WireAnnualData,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireAnnualData {
    double: String,
}

impl From<WireDatum> for ClimateDataPoint {
    fn from(datum: WireDatum) -> Self {
        ClimateDataPoint {
            gcm: datum.gcm,
            from_year: datum.from_year,
            to_year: datum.to_year,
            value: datum.annual_data.double.trim().to_string(),
        }
    }
}

impl From<&ClimateDataPoint> for WireDatum {
    fn from(point: &ClimateDataPoint) -> Self {
        WireDatum {
            gcm: point.gcm.clone(),
            variable: Some(RAINFALL_VARIABLE.to_string()),
            from_year: point.from_year,
            to_year: point.to_year,
            annual_data: WireAnnualData { double: point.value.clone() },
        }
    }
}

/// Decodes a response body into data points, preserving wire order.
///
/// A well-formed `<list/>` is an empty list, not an error.
pub fn decode_list(body: &str) -> Result<ClimateDataList, ClimateError> {
    match root_element(body)? {
        Some(name) if name == ROOT => {}
        Some(name) => {
            return Err(ClimateError::Decode(format!(
                "expected <{ROOT}> root element, found <{name}>"
            )));
        }
        None => return Err(ClimateError::Decode("response has no root element".to_string())),
    }

    let wire: WireList =
        quick_xml::de::from_str(body).map_err(|e| ClimateError::Decode(e.to_string()))?;

    Ok(wire.data.into_iter().map(ClimateDataPoint::from).collect())
}

/// Writes `list` in the same shape the upstream serves.
pub fn encode_list(list: &ClimateDataList) -> Result<String, ClimateError> {
    let wire = WireList { data: list.iter().map(WireDatum::from).collect() };
    quick_xml::se::to_string_with_root(ROOT, &wire).map_err(|e| ClimateError::Encode(e.to_string()))
}

fn root_element(body: &str) -> Result<Option<String>, ClimateError> {
    let mut reader = Reader::from_str(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Ok(Some(String::from_utf8_lossy(e.name().as_ref()).into_owned()));
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => continue,
            Err(e) => return Err(ClimateError::Decode(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GBR_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<list>
  <domain.web.AnnualGcmDatum>
    <gcm>bccr_bcm2_0</gcm>
    <variable>pr</variable>
    <fromYear>1980</fromYear>
    <toYear>1999</toYear>
    <annualData>
      <double>988.8454972331014</double>
    </annualData>
  </domain.web.AnnualGcmDatum>
  <domain.web.AnnualGcmDatum>
    <gcm>cccma_cgcm3_1</gcm>
    <variable>pr</variable>
    <fromYear>1980</fromYear>
    <toYear>1999</toYear>
    <annualData>
      <double>1012.25</double>
    </annualData>
  </domain.web.AnnualGcmDatum>
</list>"#;

    #[test]
    fn decodes_points_in_wire_order() {
        let list = decode_list(GBR_SAMPLE).expect("sample should decode");
        assert_eq!(list.len(), 2);

        let first = &list.points[0];
        assert_eq!(first.gcm.as_deref(), Some("bccr_bcm2_0"));
        assert_eq!(first.year(), Some(1980));
        assert_eq!(first.to_year, Some(1999));
        assert_eq!(first.value, "988.8454972331014");
        assert_eq!(list.points[1].value, "1012.25");
    }

    #[test]
    fn empty_list_is_not_an_error() {
        assert!(decode_list("<list/>").unwrap().is_empty());
        assert!(decode_list("<list>\n</list>").unwrap().is_empty());
        assert!(decode_list("<?xml version=\"1.0\"?>\n<list></list>").unwrap().is_empty());
    }

    #[test]
    fn blank_body_is_decode_error() {
        assert!(matches!(decode_list("   "), Err(ClimateError::Decode(_))));
    }

    #[test]
    fn unexpected_root_is_decode_error() {
        let err = decode_list("<html><body>Service unavailable</body></html>").unwrap_err();
        assert!(matches!(err, ClimateError::Decode(ref msg) if msg.contains("<html>")));
    }

    #[test]
    fn unknown_list_child_is_decode_error() {
        let body = "<list><error>no such country</error></list>";
        assert!(matches!(decode_list(body), Err(ClimateError::Decode(_))));
    }

    #[test]
    fn datum_without_annual_data_is_decode_error() {
        let body = "<list><domain.web.AnnualGcmDatum><gcm>x</gcm></domain.web.AnnualGcmDatum></list>";
        assert!(matches!(decode_list(body), Err(ClimateError::Decode(_))));
    }

    #[test]
    fn truncated_markup_is_decode_error() {
        let body = "<list><domain.web.AnnualGcmDatum><annualData><double>10";
        assert!(matches!(decode_list(body), Err(ClimateError::Decode(_))));
    }

    #[test]
    fn encode_then_decode_preserves_points() {
        let list: ClimateDataList = ["10", "11", "0.1", "988.8454972331014"]
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                ClimateDataPoint::new(v).with_gcm(format!("gcm_{i}")).with_period(1980, 1999)
            })
            .collect();

        let xml = encode_list(&list).expect("list should encode");
        let decoded = decode_list(&xml).expect("encoded list should decode");

        assert_eq!(decoded.len(), list.len());
        assert_eq!(decoded, list);
    }

    #[test]
    fn encoded_empty_list_decodes_empty() {
        let xml = encode_list(&ClimateDataList::default()).unwrap();
        assert!(decode_list(&xml).unwrap().is_empty());
    }
}
