use super::model::{CellValue, Column, ColumnKind, Table};
use crate::error::EncodeError;

// ---------------------------------------------------------------------------
// One-hot encoding
// ---------------------------------------------------------------------------

/// Result of [`one_hot_encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub table: Table,
    /// Indicator columns appended to `table`, in creation order.
    pub new_columns: Vec<String>,
}

/// Replace every listed column with one `0.0`/`1.0` indicator column per
/// distinct value, named `<column>_<value>`.
///
/// Categories are taken in sorted order; nulls form their own `nan`
/// category. The source columns are dropped and the indicators appended at
/// the end. The row count never changes. On error the input table is left
/// untouched.
pub fn one_hot_encode(table: &Table, discrete: &[String]) -> Result<Encoded, EncodeError> {
    if discrete.is_empty() {
        return Ok(Encoded {
            table: table.clone(),
            new_columns: Vec::new(),
        });
    }

    let mut indicators: Vec<Column> = Vec::new();
    for var in discrete {
        let column = table
            .column(var)
            .ok_or_else(|| EncodeError::MissingColumn(var.clone()))?;

        for category in column.unique_values() {
            let values = column
                .values
                .iter()
                .map(|v| {
                    let hit = if category == CellValue::Null {
                        v.is_null()
                    } else {
                        *v == category
                    };
                    CellValue::Float(if hit { 1.0 } else { 0.0 })
                })
                .collect();
            indicators.push(Column::new(
                format!("{var}_{category}"),
                ColumnKind::Float,
                values,
            ));
        }
    }

    let mut encoded = table.clone();
    encoded.drop_columns(discrete);

    let mut new_columns = Vec::with_capacity(indicators.len());
    for indicator in indicators {
        let name = indicator.name.clone();
        encoded
            .push_column(indicator)
            .map_err(|c| EncodeError::NameCollision(c.name))?;
        new_columns.push(name);
    }

    log::debug!(
        "encoded {} discrete columns into {} indicators",
        discrete.len(),
        new_columns.len()
    );

    Ok(Encoded {
        table: encoded,
        new_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str, vals: &[&str]) -> Column {
        Column::new(
            name,
            ColumnKind::Text,
            vals.iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(v.to_string())
                    }
                })
                .collect(),
        )
    }

    fn floats(name: &str, vals: &[f64]) -> Column {
        Column::new(
            name,
            ColumnKind::Float,
            vals.iter().map(|&v| CellValue::Float(v)).collect(),
        )
    }

    fn sample() -> Table {
        Table::from_columns(vec![
            floats("price", &[1.0, 2.0, 3.0, 4.0]),
            text("city", &["Oslo", "Bergen", "Oslo", "Tromso"]),
            floats("area", &[10.0, 20.0, 30.0, 40.0]),
            text("heating", &["gas", "", "gas", "heat pump"]),
        ])
        .unwrap()
    }

    #[test]
    fn creates_one_column_per_category() {
        let table = sample();
        let discrete = vec!["city".to_string(), "heating".to_string()];
        let encoded = one_hot_encode(&table, &discrete).unwrap();

        // 3 cities + 2 heating values + the null category.
        assert_eq!(encoded.new_columns.len(), 3 + 3);
        assert_eq!(
            encoded.new_columns,
            vec![
                "city_Bergen",
                "city_Oslo",
                "city_Tromso",
                "heating_gas",
                "heating_heat pump",
                "heating_nan",
            ]
        );
        assert_eq!(encoded.table.len(), table.len());
        assert_eq!(
            encoded.table.n_columns(),
            table.n_columns() - discrete.len() + encoded.new_columns.len()
        );
        assert!(!encoded.table.has_column("city"));
        assert!(!encoded.table.has_column("heating"));

        let oslo = encoded.table.column("city_Oslo").unwrap().to_f64();
        assert_eq!(oslo, vec![1.0, 0.0, 1.0, 0.0]);
        let missing = encoded.table.column("heating_nan").unwrap().to_f64();
        assert_eq!(missing, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn each_row_has_exactly_one_indicator_per_source_column() {
        let encoded = one_hot_encode(&sample(), &["city".to_string()]).unwrap();
        for row in 0..encoded.table.len() {
            let hits: f64 = encoded
                .new_columns
                .iter()
                .map(|c| encoded.table.column(c).unwrap().to_f64()[row])
                .sum();
            assert_eq!(hits, 1.0);
        }
    }

    #[test]
    fn numeric_categories_use_value_labels() {
        let table = Table::from_columns(vec![Column::new(
            "rooms",
            ColumnKind::Integer,
            vec![CellValue::Integer(2), CellValue::Integer(1), CellValue::Integer(2)],
        )])
        .unwrap();
        let encoded = one_hot_encode(&table, &["rooms".to_string()]).unwrap();
        assert_eq!(encoded.new_columns, vec!["rooms_1", "rooms_2"]);
    }

    #[test]
    fn empty_discrete_list_returns_input_unchanged() {
        let table = sample();
        let encoded = one_hot_encode(&table, &[]).unwrap();
        assert_eq!(encoded.table, table);
        assert!(encoded.new_columns.is_empty());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = one_hot_encode(&sample(), &["nope".to_string()]).unwrap_err();
        assert_eq!(err, EncodeError::MissingColumn("nope".into()));
    }

    #[test]
    fn colliding_indicator_name_is_an_error() {
        let mut table = sample();
        table
            .push_column(floats("city_Oslo", &[0.0, 0.0, 0.0, 0.0]))
            .unwrap();
        let err = one_hot_encode(&table, &["city".to_string()]).unwrap_err();
        assert_eq!(err, EncodeError::NameCollision("city_Oslo".into()));
    }
}
