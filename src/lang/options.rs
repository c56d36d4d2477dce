//! Per-language option surfaces (spec §4.B "Option semantics").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Any,
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CStandard {
    C11,
    C17,
}

impl CStandard {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "c11" => Some(CStandard::C11),
            "c17" => Some(CStandard::C17),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CStandard::C11 => "c11",
            CStandard::C17 => "c17",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppStandard {
    Cpp14,
    Cpp17,
    Cpp20,
}

impl CppStandard {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "c++14" | "cpp14" => Some(CppStandard::Cpp14),
            "c++17" | "cpp17" => Some(CppStandard::Cpp17),
            "c++20" | "cpp20" => Some(CppStandard::Cpp20),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
        }
    }
}

/// How allocator arguments thread through constructors of nested composites
/// (spec §4.B "ctor_convention"). Affects which constructors are emitted,
/// never the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtorConvention {
    #[default]
    Implicit,
    UsesLeadingAllocator,
    UsesTrailingAllocator,
}

impl CtorConvention {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "implicit" => Some(CtorConvention::Implicit),
            "uses-leading-allocator" => Some(CtorConvention::UsesLeadingAllocator),
            "uses-trailing-allocator" => Some(CtorConvention::UsesTrailingAllocator),
            _ => None,
        }
    }
}

/// The enumerated C++ option set (spec §4.B option table).
#[derive(Debug, Clone)]
pub struct CppOptions {
    pub std_variant: bool,
    pub allocator_include: Option<String>,
    pub allocator_type: Option<String>,
    pub variable_array_type_include: Option<String>,
    pub variable_array_type_template: Option<String>,
    pub ctor_convention: CtorConvention,
    pub enable_override_variable_array_capacity: bool,
}

impl Default for CppOptions {
    fn default() -> Self {
        CppOptions {
            std_variant: true,
            allocator_include: None,
            allocator_type: None,
            variable_array_type_include: Some("vector".to_string()),
            variable_array_type_template: Some("std::vector<{}>".to_string()),
            ctor_convention: CtorConvention::Implicit,
            enable_override_variable_array_capacity: false,
        }
    }
}

impl CppOptions {
    /// Substitutes `{}` in `variable_array_type_template` with `element`
    /// (spec §4.B: "a one-parameter template whose sole placeholder is
    /// replaced by the element type expression").
    pub fn variable_array_type_for(&self, element: &str) -> String {
        let template = self.variable_array_type_template.as_deref().unwrap_or("std::vector<{}>");
        template.replacen("{}", element, 1)
    }
}
