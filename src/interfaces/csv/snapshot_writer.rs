use crate::application::engine::Snapshot;
use crate::error::Result;
use std::io::Write;

/// Writes a final engine snapshot as CSV records: the line-item table first,
/// then `key,value` summary rows. Decimals are normalized so `75.00` prints
/// as `75`.
pub struct SnapshotWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(destination: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(destination);
        Self { writer }
    }

    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.writer
            .write_record(["id", "title", "price", "quantity", "total"])?;
        for item in &snapshot.cart {
            self.writer.write_record([
                item.id.to_string(),
                item.title.clone(),
                item.price.value().normalize().to_string(),
                item.quantity.to_string(),
                item.total.normalize().to_string(),
            ])?;
        }

        let grand_total = snapshot.grand_total.normalize().to_string();
        self.writer
            .write_record(["grand_total", grand_total.as_str()])?;
        self.writer
            .write_record(["coupon_code", snapshot.coupon_code.as_str()])?;
        let applied = snapshot.is_coupon_applied.to_string();
        self.writer
            .write_record(["is_coupon_applied", applied.as_str()])?;
        let error = snapshot
            .coupon_error
            .map(|e| e.to_string())
            .unwrap_or_default();
        self.writer
            .write_record(["coupon_error", error.as_str()])?;

        self.writer.flush()?;
        Ok(())
    }
}
