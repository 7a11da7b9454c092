use std::fmt;

/// Compile-time checked identity of one entity property.
///
/// Build it with the [`property!`](crate::property) macro, usually as an
/// associated constant of the entity:
///
/// ```
/// # use listmap::{property, Property};
/// #[derive(Default)]
/// struct Order {
///     title: String,
/// }
///
/// impl Order {
///     const TITLE: Property<Order, String> = property!(Order, title);
/// }
/// ```
pub struct Property<T, P> {
    name: &'static str,
    get: fn(&T) -> &P,
    get_mut: fn(&mut T) -> &mut P,
}

impl<T, P> Property<T, P> {
    pub const fn new(name: &'static str, get: fn(&T) -> &P, get_mut: fn(&mut T) -> &mut P) -> Self {
        Self { name, get, get_mut }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn get<'a>(&self, entity: &'a T) -> &'a P {
        (self.get)(entity)
    }

    #[inline]
    pub fn get_mut<'a>(&self, entity: &'a mut T) -> &'a mut P {
        (self.get_mut)(entity)
    }

    #[inline]
    pub fn set(&self, entity: &mut T, value: P) {
        *(self.get_mut)(entity) = value;
    }
}

impl<T, P> Clone for Property<T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for Property<T, P> {}

impl<T, P> fmt::Debug for Property<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

/// Creates a [`Property`] for a named field of a struct.
#[macro_export]
macro_rules! property {
    ($ty:ty, $field:ident) => {
        $crate::Property::<$ty, _>::new(
            stringify!($field),
            |entity| &entity.$field,
            |entity| &mut entity.$field,
        )
    };
}
