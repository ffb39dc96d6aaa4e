use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression},
    errors::ParquetError,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::Path,
    sync::Arc,
};
use tracing::debug;

use crate::error::Result;
use crate::process::normalize::ValidatedRecord;

/// The fixed output schema. It never depends on the input; every record
/// reaching the encoder already conforms.
pub fn artifact_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("codigo", DataType::Utf8, false),
        Field::new("acao", DataType::Utf8, false),
        Field::new("tipo", DataType::Utf8, false),
        Field::new("qtde_teorica", DataType::Utf8, false),
        Field::new("part", DataType::Float64, false),
    ]))
}

fn records_to_batch(records: &[ValidatedRecord]) -> Result<RecordBatch> {
    let codigo: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.codigo.as_str()),
    ));
    let acao: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.acao.as_str()),
    ));
    let tipo: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.tipo.as_str()),
    ));
    let qtde_teorica: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.qtde_teorica.as_str()),
    ));
    let part: ArrayRef = Arc::new(Float64Array::from_iter_values(
        records.iter().map(|r| r.part),
    ));

    RecordBatch::try_new(
        artifact_schema(),
        vec![codigo, acao, tipo, qtde_teorica, part],
    )
    .map_err(ParquetError::from)
    .map_err(Into::into)
}

/// Encode the validated records into a Parquet file at `path`, in input
/// order. The writer is closed before returning, so a successful return
/// means a fully finalized artifact. Returns the artifact size in bytes.
pub fn write_parquet(records: &[ValidatedRecord], path: &Path) -> Result<u64> {
    let batch = records_to_batch(records)?;

    let file = File::create(path).map_err(ParquetError::from)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .build();

    let mut writer = ArrowWriter::try_new(file, artifact_schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    let bytes = fs::metadata(path).map_err(ParquetError::from)?.len();
    debug!(rows = records.len(), bytes, path = %path.display(), "artifact finalized");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn sample_records() -> Vec<ValidatedRecord> {
        vec![
            ValidatedRecord {
                codigo: "ALOS3".into(),
                acao: "ALLOS".into(),
                tipo: "ON NM".into(),
                qtde_teorica: "495.721.524".into(),
                part: 0.516,
            },
            ValidatedRecord {
                codigo: "VALE3".into(),
                acao: "VALE".into(),
                tipo: "ON NM".into(),
                qtde_teorica: "4.539.007.580".into(),
                part: 11.645,
            },
        ]
    }

    fn read_back(path: &Path) -> Vec<RecordBatch> {
        let bytes = Bytes::from(fs::read(path).unwrap());
        let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
            .unwrap()
            .build()
            .unwrap();
        reader.map(|b| b.unwrap()).collect()
    }

    #[test]
    fn writes_rows_in_input_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("IBOVDia.parquet");

        let bytes = write_parquet(&sample_records(), &path).unwrap();
        assert!(bytes > 0);

        let batches = read_back(&path);
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);

        let first = &batches[0];
        let codigo = first
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(codigo.value(0), "ALOS3");
        let part = first
            .column(4)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(part.value(1), 11.645);
    }

    #[test]
    fn zero_rows_is_a_valid_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.parquet");

        let bytes = write_parquet(&[], &path).unwrap();
        assert!(bytes > 0);

        let total: usize = read_back(&path).iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn same_records_encode_to_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.parquet");
        let b = dir.path().join("b.parquet");

        write_parquet(&sample_records(), &a).unwrap();
        write_parquet(&sample_records(), &b).unwrap();

        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn schema_is_static_and_non_nullable() {
        let schema = artifact_schema();
        assert_eq!(schema.fields().len(), 5);
        assert!(schema.fields().iter().all(|f| !f.is_nullable()));
        assert_eq!(schema.field(4).data_type(), &DataType::Float64);
    }
}
