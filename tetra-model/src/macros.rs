/// Declares the column mapping of a struct and implements
/// [`Entity`](crate::Entity) and [`Field`](crate::Field) for it.
///
/// Each persisted field is listed with its type, optionally renamed with
/// `as "column"`. Fields listed under `transient` exist on the struct but
/// are never persisted; decoding fills them with `Default::default()`.
///
/// ```
/// use tetra_model::{entity, Entity};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct User {
///     id: String,
///     name: String,
///     age: i32,
///     cache: Vec<u8>,
/// }
///
/// entity!(User {
///     id: String,
///     name as "full_name": String,
///     age: i32,
/// } transient { cache });
///
/// assert_eq!(User::descriptor().columns(), vec!["id", "full_name", "age"]);
/// ```
#[macro_export]
macro_rules! entity {
    (
        $ty:ident {
            $( $field:ident $( as $column:literal )? : $fty:ty ),* $(,)?
        }
        $( transient { $( $skip:ident ),* $(,)? } )?
    ) => {
        impl $crate::Entity for $ty {
            fn descriptor() -> &'static $crate::EntityDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::EntityDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::EntityDescriptor::new(
                        stringify!($ty),
                        vec![$(
                            $crate::FieldDescriptor {
                                name: stringify!($field),
                                column: $crate::__column!($field $(, $column)?),
                                kind: <$fty as $crate::Field>::KIND,
                                type_name: stringify!($fty),
                            }
                        ),*],
                        vec![$($( stringify!($skip) ),*)?],
                    )
                })
            }

            #[allow(unused_mut)]
            fn to_record(&self) -> $crate::Record {
                let mut record = $crate::Record::with_capacity(
                    <Self as $crate::Entity>::descriptor().len(),
                );
                $(
                    record.push(
                        $crate::__column!($field $(, $column)?),
                        $crate::Field::to_value(&self.$field),
                    );
                )*
                record
            }

            #[allow(unused_mut, unused_variables)]
            fn from_record(mut record: $crate::Record) -> $crate::ModelResult<Self> {
                Ok(Self {
                    $( $field: record.decode::<$fty>($crate::__column!($field $(, $column)?))?, )*
                    $($( $skip: ::core::default::Default::default(), )*)?
                })
            }
        }

        impl $crate::Field for $ty {
            const KIND: $crate::FieldKind = $crate::FieldKind::Nested;

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Map($crate::Entity::to_record(self).into_document())
            }

            fn from_value(value: $crate::Value) -> $crate::ModelResult<Self> {
                let document = value.into_map()?;
                <Self as $crate::Entity>::from_record($crate::Record::from_document(document))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}
