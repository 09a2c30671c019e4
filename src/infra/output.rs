//! CSV writers for the three generated lists, plus the reader used to feed a
//! previously written gathering list back into the market step.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::{Category, CraftingListRow, Demand, GatheringListRow, MarketRecord};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat row shape of the market table; the csv serializer cannot flatten
/// nested structs.
#[derive(Serialize)]
struct MarketRow<'a> {
    #[serde(rename = "Item Name")]
    item_name: &'a str,
    #[serde(rename = "Category")]
    category: Category,
    #[serde(rename = "Item ID")]
    item_id: Option<&'a str>,
    #[serde(rename = "minListing_world")]
    min_listing_world: Option<f64>,
    #[serde(rename = "minListing_dc")]
    min_listing_dc: Option<f64>,
    #[serde(rename = "recentPurchase_world")]
    recent_purchase_world: Option<f64>,
    #[serde(rename = "recentPurchase_dc")]
    recent_purchase_dc: Option<f64>,
    #[serde(rename = "averageSalePrice_dc")]
    average_sale_price_dc: Option<f64>,
    #[serde(rename = "dailySaleVelocity_dc")]
    daily_sale_velocity_dc: Option<f64>,
}

impl<'a> From<&'a MarketRecord> for MarketRow<'a> {
    fn from(record: &'a MarketRecord) -> Self {
        let market = &record.market;
        Self {
            item_name: &record.item_name,
            category: record.category,
            item_id: record.item_id.as_deref(),
            min_listing_world: market.min_listing_world,
            min_listing_dc: market.min_listing_dc,
            recent_purchase_world: market.recent_purchase_world,
            recent_purchase_dc: market.recent_purchase_dc,
            average_sale_price_dc: market.average_sale_price_dc,
            daily_sale_velocity_dc: market.daily_sale_velocity_dc,
        }
    }
}

#[derive(Serialize)]
struct ConsolidatedRow<'a> {
    #[serde(rename = "Item")]
    item: &'a str,
    #[serde(rename = "Quantity")]
    quantity: f64,
}

pub fn create(path: &Path) -> Result<File, OutputError> {
    File::create(path).map_err(|source| OutputError::Create {
        path: path.display().to_string(),
        source,
    })
}

fn write_rows<W, T, I>(writer: W, rows: I) -> Result<usize, OutputError>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

pub fn write_gathering_list<W: Write>(
    writer: W,
    rows: &[GatheringListRow],
) -> Result<(), OutputError> {
    let count = write_rows(writer, rows)?;
    info!(rows = count, "wrote gathering list");
    Ok(())
}

pub fn write_crafting_list<W: Write>(
    writer: W,
    rows: &[CraftingListRow],
) -> Result<(), OutputError> {
    let count = write_rows(writer, rows)?;
    info!(rows = count, "wrote crafting list");
    Ok(())
}

pub fn write_market_records<W: Write>(
    writer: W,
    records: &[MarketRecord],
) -> Result<(), OutputError> {
    let count = write_rows(writer, records.iter().map(MarketRow::from))?;
    info!(rows = count, "wrote market list");
    Ok(())
}

pub fn write_consolidated<W: Write>(writer: W, demands: &[Demand]) -> Result<(), OutputError> {
    let rows = demands.iter().map(|demand| ConsolidatedRow {
        item: &demand.item,
        quantity: demand.quantity,
    });
    let count = write_rows(writer, rows)?;
    info!(rows = count, "wrote consolidated list");
    Ok(())
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, OutputError> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

fn open(path: &Path) -> Result<File, OutputError> {
    File::open(path).map_err(|source| OutputError::Open {
        path: path.display().to_string(),
        source,
    })
}

/// Read a gathering list written by [`write_gathering_list`].
pub fn read_gathering_list<R: Read>(reader: R) -> Result<Vec<GatheringListRow>, OutputError> {
    read_rows(reader)
}

pub fn open_gathering_list(path: &Path) -> Result<Vec<GatheringListRow>, OutputError> {
    read_gathering_list(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketFields;

    fn written(write: impl FnOnce(&mut Vec<u8>) -> Result<(), OutputError>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn gathering_list_leaves_missing_location_empty() {
        let rows = vec![
            GatheringListRow {
                ingredient: "Handle".to_string(),
                total_quantity: 2.0,
                location_info: None,
            },
            GatheringListRow {
                ingredient: "Ore".to_string(),
                total_quantity: 12.5,
                location_info: Some("Mine, Deep Mine".to_string()),
            },
        ];
        let csv = written(|buf| write_gathering_list(buf, &rows));
        assert_eq!(
            csv,
            "Ingredient,Total Quantity,Location Info\nHandle,2.0,\nOre,12.5,\"Mine, Deep Mine\"\n"
        );

        let back = read_gathering_list(csv.as_bytes()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn crafting_list_has_product_header() {
        let rows = vec![CraftingListRow {
            product: "Hull".to_string(),
            required_quantity: 4.0,
        }];
        let csv = written(|buf| write_crafting_list(buf, &rows));
        assert_eq!(csv, "Product,Required Quantity\nHull,4.0\n");

        let back: Vec<CraftingListRow> = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn market_records_are_flattened() {
        let mut priced = MarketRecord::new("Iron Ore", Category::Gathering);
        priced.item_id = Some("5111".to_string());
        priced.market = MarketFields {
            min_listing_world: Some(14.0),
            daily_sale_velocity_dc: Some(3.5),
            ..MarketFields::default()
        };
        let unresolved = MarketRecord::new("Mystery Dust", Category::Crafting);

        let csv = written(|buf| write_market_records(buf, &[priced, unresolved]));
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Item Name,Category,Item ID,minListing_world,minListing_dc,recentPurchase_world,\
             recentPurchase_dc,averageSalePrice_dc,dailySaleVelocity_dc"
        );
        assert_eq!(lines[1], "Iron Ore,Gathering,5111,14.0,,,,,3.5");
        assert_eq!(lines[2], "Mystery Dust,Crafting,,,,,,,");
    }

    #[test]
    fn consolidated_list_uses_item_quantity_header() {
        let csv = written(|buf| write_consolidated(buf, &[Demand::new("Hull", 5.0)]));
        assert_eq!(csv, "Item,Quantity\nHull,5.0\n");
    }
}
