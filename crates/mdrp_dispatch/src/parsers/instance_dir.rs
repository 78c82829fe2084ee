use std::path::Path;

use anyhow::{Context, anyhow};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    parsers::parser::DatasetParser,
    problem::{
        dispatch_problem::{
            CourierRecord, DispatchProblem, DispatchProblemBuilder, OrderRecord, RestaurantRecord,
        },
        instance_parameters::InstanceParameters,
        travel_times::Minutes,
    },
};

pub const ORDERS_FILE: &str = "orders.txt";
pub const RESTAURANTS_FILE: &str = "restaurants.txt";
pub const COURIERS_FILE: &str = "couriers.txt";
pub const INSTANCE_PARAMETERS_FILE: &str = "instance_parameters.txt";

/// Reads an instance directory made of four tab separated tables with a
/// header line. Columns are found by header name, so their order and any
/// extra columns do not matter.
pub struct InstanceDirParser;

impl InstanceDirParser {
    pub fn is_instance_dir<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        [
            ORDERS_FILE,
            RESTAURANTS_FILE,
            COURIERS_FILE,
            INSTANCE_PARAMETERS_FILE,
        ]
        .iter()
        .all(|file| path.join(file).is_file())
    }
}

impl DatasetParser for InstanceDirParser {
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<DispatchProblem, anyhow::Error> {
        let dir = path.as_ref();
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read {}", path.display()))
        };

        let mut builder = DispatchProblemBuilder::default();
        if let Some(name) = dir.file_name().and_then(|name| name.to_str()) {
            builder.set_id(name);
        }

        builder
            .set_orders(parse_orders(&read(ORDERS_FILE)?)?)
            .set_restaurants(parse_restaurants(&read(RESTAURANTS_FILE)?)?)
            .set_couriers(parse_couriers(&read(COURIERS_FILE)?)?)
            .set_parameters(parse_instance_parameters(&read(INSTANCE_PARAMETERS_FILE)?)?);

        Ok(builder.build()?)
    }
}

fn read_rows<T: DeserializeOwned>(name: &str, text: &str) -> Result<Vec<T>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize()
        .map(|row| row.with_context(|| format!("Cannot read {name}")))
        .collect()
}

#[derive(Deserialize)]
struct OrderRow {
    order: String,
    x: f64,
    y: f64,
    placement_time: Minutes,
    restaurant: String,
    ready_time: Minutes,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        OrderRecord {
            id: row.order,
            x: row.x,
            y: row.y,
            placement_time: row.placement_time,
            restaurant: row.restaurant,
            ready_time: row.ready_time,
        }
    }
}

#[derive(Deserialize)]
struct RestaurantRow {
    restaurant: String,
    x: f64,
    y: f64,
}

impl From<RestaurantRow> for RestaurantRecord {
    fn from(row: RestaurantRow) -> Self {
        RestaurantRecord {
            id: row.restaurant,
            x: row.x,
            y: row.y,
        }
    }
}

#[derive(Deserialize)]
struct CourierRow {
    courier: String,
    x: f64,
    y: f64,
    on_time: Minutes,
    off_time: Minutes,
}

impl From<CourierRow> for CourierRecord {
    fn from(row: CourierRow) -> Self {
        CourierRecord {
            id: row.courier,
            x: row.x,
            y: row.y,
            on_time: row.on_time,
            off_time: row.off_time,
        }
    }
}

#[derive(Deserialize)]
struct InstanceParametersRow {
    meters_per_minute: f64,
    #[serde(rename = "pickup service minutes")]
    pickup_service_minutes: Minutes,
    #[serde(rename = "dropoff service minutes")]
    dropoff_service_minutes: Minutes,
    #[serde(rename = "target click-to-door")]
    target_click_to_door: Minutes,
    #[serde(rename = "pay per order")]
    pay_per_order: f64,
    #[serde(rename = "guaranteed pay per hour")]
    guaranteed_pay_per_hour: f64,
}

impl From<InstanceParametersRow> for InstanceParameters {
    fn from(row: InstanceParametersRow) -> Self {
        InstanceParameters {
            meters_per_minute: row.meters_per_minute,
            pickup_service_minutes: row.pickup_service_minutes,
            dropoff_service_minutes: row.dropoff_service_minutes,
            target_click_to_door: row.target_click_to_door,
            pay_per_order: row.pay_per_order,
            guaranteed_pay_per_hour: row.guaranteed_pay_per_hour,
        }
    }
}

pub fn parse_orders(text: &str) -> Result<Vec<OrderRecord>, anyhow::Error> {
    let rows: Vec<OrderRow> = read_rows(ORDERS_FILE, text)?;
    Ok(rows.into_iter().map(OrderRecord::from).collect())
}

pub fn parse_restaurants(text: &str) -> Result<Vec<RestaurantRecord>, anyhow::Error> {
    let rows: Vec<RestaurantRow> = read_rows(RESTAURANTS_FILE, text)?;
    Ok(rows.into_iter().map(RestaurantRecord::from).collect())
}

pub fn parse_couriers(text: &str) -> Result<Vec<CourierRecord>, anyhow::Error> {
    let rows: Vec<CourierRow> = read_rows(COURIERS_FILE, text)?;
    Ok(rows.into_iter().map(CourierRecord::from).collect())
}

/// Only the first data row is read.
pub fn parse_instance_parameters(text: &str) -> Result<InstanceParameters, anyhow::Error> {
    let rows: Vec<InstanceParametersRow> = read_rows(INSTANCE_PARAMETERS_FILE, text)?;
    rows.into_iter()
        .next()
        .map(InstanceParameters::from)
        .ok_or_else(|| anyhow!("{INSTANCE_PARAMETERS_FILE}: no data row"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_by_header_name() {
        let text = "restaurant\tready_time\torder\tx\ty\tplacement_time\n\
                    r1\t12\to1\t100\t200\t3\n\
                    r2\t14.5\to2\t-10\t0\t4\n";

        let orders = parse_orders(text).unwrap();

        assert_eq!(
            orders,
            vec![
                OrderRecord {
                    id: "o1".to_owned(),
                    x: 100.0,
                    y: 200.0,
                    placement_time: 3.0,
                    restaurant: "r1".to_owned(),
                    ready_time: 12.0,
                },
                OrderRecord {
                    id: "o2".to_owned(),
                    x: -10.0,
                    y: 0.0,
                    placement_time: 4.0,
                    restaurant: "r2".to_owned(),
                    ready_time: 14.5,
                },
            ]
        );
    }

    #[test]
    fn test_instance_parameters() {
        let text = "meters_per_minute\tpickup service minutes\tdropoff service minutes\ttarget click-to-door\tpay per order\tguaranteed pay per hour\n\
                    320\t4\t4\t40\t10\t15\n";

        let parameters = parse_instance_parameters(text).unwrap();

        assert_eq!(parameters, InstanceParameters::default());
    }

    #[test]
    fn test_missing_column() {
        let error = parse_restaurants("restaurant\tx\nr1\t1\n").unwrap_err();

        assert!(format!("{error:#}").contains("missing field `y`"));
    }

    #[test]
    fn test_invalid_number() {
        let error = parse_couriers("courier\tx\ty\ton_time\toff_time\nc1\t0\t0\tnoon\t600\n")
            .unwrap_err();

        assert!(error.to_string().contains(COURIERS_FILE));
        assert!(format!("{error:#}").contains("invalid float literal"));
    }

    #[test]
    fn test_extra_columns_and_padding_are_ignored() {
        let text = "restaurant\t x \tcity\ty\n r1 \t 12.5\tNYC\t-3\nr2\t0\tNYC\t0\n";

        let restaurants = parse_restaurants(text).unwrap();

        assert_eq!(
            restaurants,
            vec![
                RestaurantRecord {
                    id: "r1".to_owned(),
                    x: 12.5,
                    y: -3.0,
                },
                RestaurantRecord {
                    id: "r2".to_owned(),
                    x: 0.0,
                    y: 0.0,
                },
            ]
        );
    }

    #[test]
    fn test_instance_parameters_without_rows() {
        let text = "meters_per_minute\tpickup service minutes\tdropoff service minutes\ttarget click-to-door\tpay per order\tguaranteed pay per hour\n";

        let error = parse_instance_parameters(text).unwrap_err();

        assert!(error.to_string().contains("no data row"));
    }
}
