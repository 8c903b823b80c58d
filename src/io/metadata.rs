//! Sentinel-2 product (MTD_MSIL1C.xml) and tile (MTD_TL.xml) metadata scanning
//!
//! Only the values needed for radiometric conversion are extracted. Elements
//! are matched by local name wherever they appear, so processing-baseline
//! differences in the surrounding layout do not matter.

use crate::types::{FireError, FireResult, LogicalBand};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct XmlElement {
    name: String,
    parent: Option<usize>,
    attributes: Vec<(String, String)>,
    text: String,
}

impl XmlElement {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn element_from(start: &BytesStart<'_>, parent: Option<usize>) -> FireResult<XmlElement> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FireError::XmlParsing(format!("Bad attribute in <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| FireError::XmlParsing(format!("Bad attribute value in <{}>: {}", name, e)))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        parent,
        attributes,
        text: String::new(),
    })
}

/// Flatten a document into elements with parent links and trimmed text
fn parse_elements(xml: &str) -> FireResult<Vec<XmlElement>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut elements: Vec<XmlElement> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let element = element_from(&start, open.last().copied())?;
                elements.push(element);
                open.push(elements.len() - 1);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from(&start, open.last().copied())?;
                elements.push(element);
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| FireError::XmlParsing(format!("Bad text content: {}", e)))?;
                if let Some(&current) = open.last() {
                    elements[current].text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(&current) = open.last() {
                    elements[current]
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FireError::XmlParsing(format!(
                    "Failed to parse metadata XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if elements.is_empty() {
        return Err(FireError::XmlParsing("Metadata XML has no elements".to_string()));
    }

    Ok(elements)
}

fn parse_number(element: &XmlElement) -> FireResult<f64> {
    element.text.trim().parse::<f64>().map_err(|_| {
        FireError::Metadata(format!("Invalid {} value '{}'", element.name, element.text))
    })
}

fn parse_band_id(element: &XmlElement) -> FireResult<u8> {
    let raw = element
        .attribute("bandId")
        .ok_or_else(|| FireError::Metadata(format!("<{}> without bandId", element.name)))?;
    raw.trim()
        .parse::<u8>()
        .map_err(|_| FireError::Metadata(format!("Invalid bandId '{}' in <{}>", raw, element.name)))
}

fn parse_time(element: &XmlElement) -> FireResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(element.text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            FireError::Metadata(format!(
                "Invalid {} timestamp '{}': {}",
                element.name, element.text, e
            ))
        })
}

const SENSING_TIME_TAGS: [&str; 3] = ["PRODUCT_START_TIME", "DATATAKE_SENSING_START", "SENSING_TIME"];

/// Radiometric values from the product-level metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductMetadata {
    /// Earth-Sun distance correction factor
    pub u: Option<f64>,
    pub quantification_value: Option<f32>,
    /// Solar irradiance keyed by metadata `bandId`
    pub solar_irradiance: BTreeMap<u8, f64>,
    /// `bandId` to band, from the Spectral_Information list
    pub band_ids: BTreeMap<u8, LogicalBand>,
    pub sensing_time: Option<DateTime<Utc>>,
}

impl ProductMetadata {
    pub fn parse(xml: &str) -> FireResult<Self> {
        let elements = parse_elements(xml)?;
        let mut metadata = ProductMetadata::default();

        for element in &elements {
            match element.name.as_str() {
                "U" => metadata.u = Some(parse_number(element)?),
                "QUANTIFICATION_VALUE" | "L1C_TOA_QUANTIFICATION_VALUE" => {
                    metadata.quantification_value = Some(parse_number(element)? as f32)
                }
                "SOLAR_IRRADIANCE" => {
                    let id = parse_band_id(element)?;
                    metadata.solar_irradiance.insert(id, parse_number(element)?);
                }
                "Spectral_Information" => {
                    let id = parse_band_id(element)?;
                    if let Some(physical) = element.attribute("physicalBand") {
                        metadata.band_ids.insert(id, physical.parse::<LogicalBand>()?);
                    }
                }
                name if SENSING_TIME_TAGS.contains(&name) && metadata.sensing_time.is_none() => {
                    metadata.sensing_time = Some(parse_time(element)?);
                }
                _ => {}
            }
        }

        log::debug!(
            "Product metadata: U={:?}, quantification={:?}, {} irradiance values",
            metadata.u,
            metadata.quantification_value,
            metadata.solar_irradiance.len()
        );

        Ok(metadata)
    }

    /// Band for a metadata `bandId`, falling back to the standard ordering
    pub fn band_for_id(&self, id: u8) -> Option<LogicalBand> {
        self.band_ids
            .get(&id)
            .copied()
            .or_else(|| LogicalBand::from_metadata_id(id))
    }
}

/// Viewing and illumination geometry from the tile-level metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMetadata {
    pub sun_zenith_deg: Option<f64>,
    /// Mean viewing incidence zenith keyed by metadata `bandId`
    pub viewing_zenith_deg: BTreeMap<u8, f64>,
    pub sensing_time: Option<DateTime<Utc>>,
}

impl TileMetadata {
    pub fn parse(xml: &str) -> FireResult<Self> {
        let elements = parse_elements(xml)?;
        let mut metadata = TileMetadata::default();

        for element in &elements {
            match element.name.as_str() {
                "ZENITH_ANGLE" => {
                    let Some(parent) = element.parent.map(|p| &elements[p]) else {
                        continue;
                    };
                    match parent.name.as_str() {
                        "Mean_Sun_Angle" => metadata.sun_zenith_deg = Some(parse_number(element)?),
                        "Mean_Viewing_Incidence_Angle" => {
                            let id = parse_band_id(parent)?;
                            metadata.viewing_zenith_deg.insert(id, parse_number(element)?);
                        }
                        _ => {}
                    }
                }
                name if SENSING_TIME_TAGS.contains(&name) && metadata.sensing_time.is_none() => {
                    metadata.sensing_time = Some(parse_time(element)?);
                }
                _ => {}
            }
        }

        log::debug!(
            "Tile metadata: sun zenith={:?}, {} viewing angles",
            metadata.sun_zenith_deg,
            metadata.viewing_zenith_deg.len()
        );

        Ok(metadata)
    }
}
