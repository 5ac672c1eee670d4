use crate::domain::product::{Price, Product};
use crate::error::{CartError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// A validated cart operation parsed from one script row.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    Add { product: Product, quantity: u32 },
    Update { id: u64, quantity: i64 },
    Remove { id: u64 },
    Clear,
    SetCoupon { code: String },
    ApplyCoupon,
    RemoveCoupon,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case")]
enum ActionKind {
    Add,
    Update,
    Remove,
    Clear,
    SetCoupon,
    ApplyCoupon,
    RemoveCoupon,
}

/// Raw CSV row: `op,id,title,price,image,quantity,code`. Fields irrelevant
/// to an op are left empty.
#[derive(Debug, Deserialize)]
struct ActionRecord {
    op: ActionKind,
    id: Option<u64>,
    title: Option<String>,
    price: Option<Decimal>,
    image: Option<String>,
    quantity: Option<i64>,
    code: Option<String>,
}

impl TryFrom<ActionRecord> for CartAction {
    type Error = CartError;

    fn try_from(record: ActionRecord) -> Result<Self> {
        fn require<T>(field: Option<T>, name: &str, op: &str) -> Result<T> {
            field.ok_or_else(|| CartError::Validation(format!("{op} requires a {name}")))
        }

        match record.op {
            ActionKind::Add => {
                let id = require(record.id, "id", "add")?;
                let title = require(record.title, "title", "add")?;
                let price = Price::new(require(record.price, "price", "add")?)?;
                let quantity = match record.quantity {
                    None => 1,
                    Some(q) if q >= 1 => q.min(i64::from(u32::MAX)) as u32,
                    Some(_) => {
                        return Err(CartError::Validation(
                            "add quantity must be at least 1".to_string(),
                        ));
                    }
                };
                Ok(CartAction::Add {
                    product: Product {
                        id,
                        title,
                        price,
                        image: record.image.unwrap_or_default(),
                    },
                    quantity,
                })
            }
            ActionKind::Update => Ok(CartAction::Update {
                id: require(record.id, "id", "update")?,
                // Zero or negative is allowed here; the engine clamps.
                quantity: require(record.quantity, "quantity", "update")?,
            }),
            ActionKind::Remove => Ok(CartAction::Remove {
                id: require(record.id, "id", "remove")?,
            }),
            ActionKind::Clear => Ok(CartAction::Clear),
            ActionKind::SetCoupon => Ok(CartAction::SetCoupon {
                code: record.code.unwrap_or_default(),
            }),
            ActionKind::ApplyCoupon => Ok(CartAction::ApplyCoupon),
            ActionKind::RemoveCoupon => Ok(CartAction::RemoveCoupon),
        }
    }
}

/// Reads cart actions from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<CartAction>` lazily, so a bad row
/// is reported without aborting the rest of the script. Whitespace is
/// trimmed and record lengths are flexible.
pub struct ActionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ActionReader<R> {
    /// Creates a new `ActionReader` from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes, and validates
    /// actions.
    pub fn actions(self) -> impl Iterator<Item = Result<CartAction>> {
        self.reader
            .into_deserialize::<ActionRecord>()
            .map(|result| CartAction::try_from(result?))
    }
}
