use comfy_table::{Table, presets::UTF8_FULL};
use mdrp_dispatch::dispatch::statistics::DispatchStatistics;

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| format!("{value:.2}"))
}

pub fn statistics_table<'a>(
    rows: impl IntoIterator<Item = (&'a str, &'a DispatchStatistics)>,
) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Instance",
        "Orders",
        "Delivered",
        "Unassigned",
        "Assignments",
        "Couriers",
        "Click-to-door",
        "On time",
        "Ready-to-pickup",
        "Cost",
        "Compensation",
    ]);

    for (name, statistics) in rows {
        table.add_row(vec![
            name.to_owned(),
            statistics.orders.to_string(),
            statistics.delivered_orders.to_string(),
            statistics.unassigned_orders.to_string(),
            statistics.assignments.to_string(),
            statistics.couriers_used.to_string(),
            optional(statistics.mean_click_to_door),
            optional(statistics.on_time_ratio),
            optional(statistics.mean_ready_to_pickup),
            format!("{:.2}", statistics.total_cost),
            format!("{:.2}", statistics.courier_compensation),
        ]);
    }

    table
}
