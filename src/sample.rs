use crate::models::{Cell, ColumnMap, RawRow, RawTable};

struct SampleProduct {
    name: &'static str,
    price: i64,
    cost: i64,
}

const PRODUCTS: &[SampleProduct] = &[
    SampleProduct { name: "사과 1kg", price: 15000, cost: 9000 },
    SampleProduct { name: "귤 2kg", price: 12000, cost: 7500 },
    SampleProduct { name: "배 선물세트", price: 39000, cost: 26000 },
    SampleProduct { name: "샤인머스캣 500g", price: 18900, cost: 12500 },
    SampleProduct { name: "딸기 750g", price: 16500, cost: 11000 },
];

/// Quantities cycled across orders.
const QUANTITIES: &[i64] = &[1, 2, 1, 3, 1, 2, 5, 1, 1, 4];

const ORDER_COUNT: usize = 30;

/// A month of sample orders labelled with the configured columns.
///
/// Deterministic: the same table is produced on every call.
pub fn sample_table(columns: &ColumnMap) -> RawTable {
    let headers = vec![
        columns.order_id.clone(),
        columns.order_date.clone(),
        columns.product_name.clone(),
        columns.quantity_sold.clone(),
        columns.unit_price.clone(),
        columns.unit_cost.clone(),
    ];

    let rows = (0..ORDER_COUNT)
        .map(|i| {
            // Skew toward the first products so the summary has a clear leader.
            let product = &PRODUCTS[(i * i + i / 3) % PRODUCTS.len()];
            let qty = QUANTITIES[i % QUANTITIES.len()];
            let day = (i % 28) + 1;
            let mut row = RawRow::new();
            row.insert(columns.order_id.clone(), Cell::Text(format!("2025030{:04}", i + 1)));
            row.insert(columns.order_date.clone(), Cell::Text(format!("2025-03-{day:02}")));
            row.insert(columns.product_name.clone(), Cell::Text(product.name.to_string()));
            row.insert(columns.quantity_sold.clone(), Cell::Int(qty));
            row.insert(columns.unit_price.clone(), Cell::Int(product.price));
            row.insert(columns.unit_cost.clone(), Cell::Int(product.cost));
            row
        })
        .collect();

    RawTable { headers, rows }
}
