use fxhash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::DispatchError,
    problem::{
        courier::{Courier, CourierIdx},
        instance_parameters::InstanceParameters,
        location::{Location, LocationIdx},
        order::{Order, OrderIdx},
        restaurant::{Restaurant, RestaurantIdx},
        travel_times::{Minutes, TravelTimes},
    },
};

/// Immutable arena of everything a dispatch run reads: the coordinate table,
/// orders, restaurants, couriers and the instance parameters.
///
/// Entities are addressed by their index newtypes. External ids are only
/// resolved at the edges through the `*_idx` lookups.
#[derive(Debug)]
pub struct DispatchProblem {
    id: Option<String>,
    travel_times: TravelTimes,
    orders: Vec<Order>,
    restaurants: Vec<Restaurant>,
    couriers: Vec<Courier>,
    parameters: InstanceParameters,

    order_index: FxHashMap<String, OrderIdx>,
    restaurant_index: FxHashMap<String, RestaurantIdx>,
    courier_index: FxHashMap<String, CourierIdx>,
}

impl DispatchProblem {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order_id: OrderIdx) -> &Order {
        &self.orders[order_id]
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn restaurant(&self, restaurant_id: RestaurantIdx) -> &Restaurant {
        &self.restaurants[restaurant_id]
    }

    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    pub fn courier(&self, courier_id: CourierIdx) -> &Courier {
        &self.couriers[courier_id]
    }

    pub fn parameters(&self) -> &InstanceParameters {
        &self.parameters
    }

    pub fn travel_times(&self) -> &TravelTimes {
        &self.travel_times
    }

    pub fn location(&self, location_id: LocationIdx) -> &Location {
        self.travel_times.location(location_id)
    }

    #[inline]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> Minutes {
        self.travel_times.travel_time(from, to)
    }

    pub fn restaurant_location(&self, restaurant_id: RestaurantIdx) -> LocationIdx {
        self.restaurants[restaurant_id].location_id()
    }

    pub fn order_idx(&self, external_id: &str) -> Result<OrderIdx, DispatchError> {
        self.order_index
            .get(external_id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownOrder(external_id.to_owned()))
    }

    pub fn restaurant_idx(&self, external_id: &str) -> Result<RestaurantIdx, DispatchError> {
        self.restaurant_index
            .get(external_id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownRestaurant(external_id.to_owned()))
    }

    pub fn courier_idx(&self, external_id: &str) -> Result<CourierIdx, DispatchError> {
        self.courier_index
            .get(external_id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownCourier(external_id.to_owned()))
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename = "Order")]
pub struct OrderRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub placement_time: Minutes,
    pub restaurant: String,
    pub ready_time: Minutes,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename = "Restaurant")]
pub struct RestaurantRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename = "Courier")]
pub struct CourierRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub on_time: Minutes,
    pub off_time: Minutes,
}

#[derive(Default)]
pub struct DispatchProblemBuilder {
    id: Option<String>,
    orders: Vec<OrderRecord>,
    restaurants: Vec<RestaurantRecord>,
    couriers: Vec<CourierRecord>,
    parameters: Option<InstanceParameters>,
}

impl DispatchProblemBuilder {
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut DispatchProblemBuilder {
        self.id = Some(id.into());
        self
    }

    pub fn add_order(&mut self, order: OrderRecord) -> &mut DispatchProblemBuilder {
        self.orders.push(order);
        self
    }

    pub fn set_orders(&mut self, orders: Vec<OrderRecord>) -> &mut DispatchProblemBuilder {
        self.orders = orders;
        self
    }

    pub fn add_restaurant(&mut self, restaurant: RestaurantRecord) -> &mut DispatchProblemBuilder {
        self.restaurants.push(restaurant);
        self
    }

    pub fn set_restaurants(
        &mut self,
        restaurants: Vec<RestaurantRecord>,
    ) -> &mut DispatchProblemBuilder {
        self.restaurants = restaurants;
        self
    }

    pub fn add_courier(&mut self, courier: CourierRecord) -> &mut DispatchProblemBuilder {
        self.couriers.push(courier);
        self
    }

    pub fn set_couriers(&mut self, couriers: Vec<CourierRecord>) -> &mut DispatchProblemBuilder {
        self.couriers = couriers;
        self
    }

    pub fn set_parameters(
        &mut self,
        parameters: InstanceParameters,
    ) -> &mut DispatchProblemBuilder {
        self.parameters = Some(parameters);
        self
    }

    /// Resolves all cross references and builds the arena.
    ///
    /// Orders are stored sorted by external id, which fixes the order in which
    /// the bundle construction visits them.
    pub fn build(self) -> Result<DispatchProblem, DispatchError> {
        let DispatchProblemBuilder {
            id,
            mut orders,
            restaurants,
            couriers,
            parameters,
        } = self;

        if orders.is_empty() {
            return Err(DispatchError::EmptyInstance("orders"));
        }
        if restaurants.is_empty() {
            return Err(DispatchError::EmptyInstance("restaurants"));
        }
        if couriers.is_empty() {
            return Err(DispatchError::EmptyInstance("couriers"));
        }

        let parameters = parameters.unwrap_or_default();

        orders.sort_by(|a, b| a.id.cmp(&b.id));

        let mut locations = Vec::with_capacity(orders.len() + restaurants.len() + couriers.len());
        locations.extend(
            orders
                .iter()
                .map(|order| Location::from_cartesian(order.id.as_str(), order.x, order.y)),
        );
        locations.extend(restaurants.iter().map(|restaurant| {
            Location::from_cartesian(restaurant.id.as_str(), restaurant.x, restaurant.y)
        }));
        locations.extend(
            couriers
                .iter()
                .map(|courier| Location::from_cartesian(courier.id.as_str(), courier.x, courier.y)),
        );

        let travel_times = TravelTimes::new(locations, parameters.meters_per_minute)?;

        let mut restaurant_index = FxHashMap::default();
        let restaurants = restaurants
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let location_id = travel_times.location_idx(&record.id)?;
                restaurant_index.insert(record.id.clone(), RestaurantIdx::new(index));
                Ok(Restaurant::new(record.id, location_id))
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let mut order_index = FxHashMap::default();
        let orders = orders
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let location_id = travel_times.location_idx(&record.id)?;
                let restaurant_id = restaurant_index
                    .get(&record.restaurant)
                    .copied()
                    .ok_or_else(|| DispatchError::UnknownRestaurant(record.restaurant.clone()))?;
                order_index.insert(record.id.clone(), OrderIdx::new(index));
                Ok(Order::new(
                    record.id,
                    location_id,
                    restaurant_id,
                    record.placement_time,
                    record.ready_time,
                ))
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let mut courier_index = FxHashMap::default();
        let couriers = couriers
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                if record.off_time < record.on_time {
                    return Err(DispatchError::InvalidConfiguration(format!(
                        "courier {} goes off duty at {} before going on duty at {}",
                        record.id, record.off_time, record.on_time
                    )));
                }
                let location_id = travel_times.location_idx(&record.id)?;
                courier_index.insert(record.id.clone(), CourierIdx::new(index));
                Ok(Courier::new(
                    record.id,
                    location_id,
                    record.on_time,
                    record.off_time,
                ))
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        Ok(DispatchProblem {
            id,
            travel_times,
            orders,
            restaurants,
            couriers,
            parameters,
            order_index,
            restaurant_index,
            courier_index,
        })
    }
}
