use crate::{EntityDescriptor, ModelResult, Record};

/// A struct with a declared column mapping.
///
/// Implemented by [`entity!`](crate::entity). `to_record` emits the columns
/// in descriptor order; `from_record` tolerates missing columns by decoding
/// them from `Value::Null`, which fails for required scalars and yields the
/// empty value for options and collections.
pub trait Entity: Sized + Send + Sync + 'static {
    /// The cached, ordered field list of this type.
    fn descriptor() -> &'static EntityDescriptor;

    fn to_record(&self) -> Record;

    fn from_record(record: Record) -> ModelResult<Self>;
}
