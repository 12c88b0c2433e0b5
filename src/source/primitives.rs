//! Primitive types: wrappers, widening conversions, numeric families.

use serde::Serialize;

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const CLASS: &str = "java.lang.Class";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Char,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "char" => Primitive::Char,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn wrapper(self) -> &'static str {
        match self {
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Short => "java.lang.Short",
            Primitive::Char => "java.lang.Character",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }

    pub fn from_wrapper(name: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.wrapper() == name)
    }

    /// Sources that widen to `self` without a cast (JLS 5.1.2).
    pub fn widened_from(self) -> &'static [Primitive] {
        use Primitive::*;
        match self {
            Short => &[Byte],
            Int => &[Short, Byte, Char],
            Long => &[Int, Short, Byte, Char],
            Float => &[Long, Int, Short, Byte, Char],
            Double => &[Long, Float, Int, Short, Byte, Char],
            Boolean | Byte | Char => &[],
        }
    }

    /// True when a value of type `from` is accepted where `self` is expected.
    pub fn accepts(self, from: Primitive) -> bool {
        self == from || self.widened_from().contains(&from)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int | Primitive::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Primitive::Float | Primitive::Double)
    }
}

pub fn is_primitive_name(name: &str) -> bool {
    Primitive::from_name(name).is_some()
}

/// Binary numeric promotion: double, then float, then long, else int.
/// Boxed operands are unboxed first; `None` if either side is not numeric.
pub fn promote(left: &str, right: &str) -> Option<Primitive> {
    let unbox = |name: &str| Primitive::from_name(name).or_else(|| Primitive::from_wrapper(name));
    let (l, r) = (unbox(left)?, unbox(right)?);
    if l == Primitive::Boolean || r == Primitive::Boolean {
        return None;
    }
    for candidate in [Primitive::Double, Primitive::Float, Primitive::Long] {
        if l == candidate || r == candidate {
            return Some(candidate);
        }
    }
    Some(Primitive::Int)
}
