//! Embedded analytical store executor.
//!
//! Runs plans against columnar files (parquet) through an embedded
//! DataFusion session. The spatial predicate is a session-registered
//! `st_intersects(hex_wkb, wkt)` scalar function, so intersection testing
//! stays on the store side of the executor seam.

use std::sync::Arc;

use async_trait::async_trait;
use datafusion::arrow::array::{
    Array, BooleanBuilder, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray,
};
use datafusion::arrow::datatypes::{DataType, TimeUnit};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::ScalarValue;
use datafusion::error::DataFusionError;
use datafusion::logical_expr::{create_udf, ColumnarValue, ScalarUDF, Volatility};
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use geo::Intersects;

use crate::geometry;
use crate::query::{ColumnMap, Param, QueryPlan};

use super::errors::{StoreError, StoreResult};
use super::sql::{render, SqlDialect};
use super::{Cell, RowSet, StoreExecutor};

/// Executor over parquet-backed item files.
pub struct AnalyticsStore {
    ctx: SessionContext,
    columns: ColumnMap,
    max_limit: u32,
}

impl AnalyticsStore {
    /// Opens a session, registers the spatial predicate, and registers the
    /// parquet data under the column map's relation name.
    pub async fn open(
        parquet_path: &str,
        columns: ColumnMap,
        max_limit: u32,
    ) -> StoreResult<Self> {
        let ctx = SessionContext::new();
        ctx.register_udf(st_intersects_udf());
        ctx.register_parquet(&columns.relation, parquet_path, ParquetReadOptions::default())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            ctx,
            columns,
            max_limit,
        })
    }
}

#[async_trait]
impl StoreExecutor for AnalyticsStore {
    fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    fn max_limit(&self) -> u32 {
        self.max_limit
    }

    async fn execute(&self, plan: &QueryPlan) -> StoreResult<RowSet> {
        let sql = render(plan, SqlDialect::Analytics);

        let df = self
            .ctx
            .sql(&sql.text)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .with_param_values(scalar_values(&sql.params))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let columns: Vec<String> = df
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();

        let batches = df
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut out = RowSet::new(columns);
        for batch in &batches {
            append_batch(&mut out, batch)?;
        }
        Ok(out)
    }
}

fn scalar_values(params: &[Param]) -> Vec<ScalarValue> {
    params
        .iter()
        .map(|p| match p {
            Param::Text(v) => ScalarValue::Utf8(Some(v.clone())),
            Param::Int(v) => ScalarValue::Int64(Some(*v)),
            Param::Float(v) => ScalarValue::Float64(Some(*v)),
            Param::Timestamp(v) => {
                ScalarValue::TimestampMicrosecond(Some(v.and_utc().timestamp_micros()), None)
            }
        })
        .collect()
}

/// Converts one record batch into store-agnostic rows.
fn append_batch(out: &mut RowSet, batch: &RecordBatch) -> StoreResult<()> {
    let column_count = batch.num_columns();
    for row_idx in 0..batch.num_rows() {
        let mut cells = Vec::with_capacity(column_count);
        for col_idx in 0..column_count {
            cells.push(read_cell(batch, col_idx, row_idx)?);
        }
        out.rows.push(cells);
    }
    Ok(())
}

fn read_cell(batch: &RecordBatch, col: usize, row: usize) -> StoreResult<Cell> {
    let array = batch.column(col);
    if array.is_null(row) {
        return Ok(Cell::Null);
    }

    macro_rules! typed {
        ($ty:ty) => {
            array.as_any().downcast_ref::<$ty>().ok_or_else(|| {
                StoreError::Unavailable(format!("column {} downcast failed", col))
            })?
        };
    }

    let cell = match array.data_type() {
        DataType::Utf8 => Cell::Text(typed!(StringArray).value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(typed!(LargeStringArray).value(row).to_string()),
        DataType::Int32 => Cell::Int(typed!(Int32Array).value(row) as i64),
        DataType::Int64 => Cell::Int(typed!(Int64Array).value(row)),
        DataType::Float32 => Cell::Float(typed!(Float32Array).value(row) as f64),
        DataType::Float64 => Cell::Float(typed!(Float64Array).value(row)),
        DataType::Binary => Cell::Bytes(
            typed!(datafusion::arrow::array::BinaryArray)
                .value(row)
                .to_vec(),
        ),
        DataType::Timestamp(unit, _) => timestamp_cell(batch, col, row, unit)?,
        other => {
            return Err(StoreError::Unavailable(format!(
                "unsupported column type {:?}",
                other
            )))
        }
    };
    Ok(cell)
}

fn timestamp_cell(
    batch: &RecordBatch,
    col: usize,
    row: usize,
    unit: &TimeUnit,
) -> StoreResult<Cell> {
    let array = batch.column(col);

    macro_rules! typed {
        ($ty:ty) => {
            array.as_any().downcast_ref::<$ty>().ok_or_else(|| {
                StoreError::Unavailable(format!("timestamp column {} downcast failed", col))
            })?
        };
    }

    let utc = match unit {
        TimeUnit::Second => {
            chrono::DateTime::from_timestamp(typed!(TimestampSecondArray).value(row), 0)
        }
        TimeUnit::Millisecond => {
            chrono::DateTime::from_timestamp_millis(typed!(TimestampMillisecondArray).value(row))
        }
        TimeUnit::Microsecond => {
            chrono::DateTime::from_timestamp_micros(typed!(TimestampMicrosecondArray).value(row))
        }
        TimeUnit::Nanosecond => Some(chrono::DateTime::from_timestamp_nanos(
            typed!(TimestampNanosecondArray).value(row),
        )),
    };

    utc.map(|dt| Cell::Timestamp(dt.naive_utc()))
        .ok_or_else(|| StoreError::Unavailable("timestamp out of range".into()))
}

/// `st_intersects(hex_wkb, wkt) -> boolean` over stored footprints.
fn st_intersects_udf() -> ScalarUDF {
    let fun = Arc::new(|args: &[ColumnarValue]| -> datafusion::error::Result<ColumnarValue> {
        let arrays = ColumnarValue::values_to_arrays(args)?;
        let stored = arrays[0]
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                DataFusionError::Execution("st_intersects expects utf8 geometry column".into())
            })?;
        let probes = arrays[1]
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                DataFusionError::Execution("st_intersects expects utf8 probe geometry".into())
            })?;

        let mut out = BooleanBuilder::with_capacity(stored.len());
        for i in 0..stored.len() {
            if stored.is_null(i) || probes.is_null(i) {
                out.append_null();
                continue;
            }
            let footprint = geometry::decode_wkb_hex(stored.value(i))
                .map_err(|e| DataFusionError::Execution(e.to_string()))?;
            let probe = geometry::parse_wkt(probes.value(i))
                .map_err(|e| DataFusionError::Execution(e.to_string()))?;
            out.append_value(footprint.intersects(&probe));
        }
        Ok(ColumnarValue::Array(Arc::new(out.finish())))
    });

    create_udf(
        "st_intersects",
        vec![DataType::Utf8, DataType::Utf8],
        DataType::Boolean,
        Volatility::Immutable,
        fun,
    )
}
