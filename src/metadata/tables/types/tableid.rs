use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers of the metadata tables, by table number.
///
/// Covers the ECMA-335 type-system tables (`0x00..=0x2C`) the external binary may contain and
/// the Portable PDB debug tables (`0x30..=0x37`). The numeric value of each variant is its table
/// number, which is also its bit in the `valid` and `sorted` masks of a `#~` stream and in the
/// `ReferencedTypeSystemTables` mask of a `#Pdb` stream.
///
/// Iteration order (`TableId::iter()`) is ascending table number, which is also the order
/// row counts and rows appear in a tables stream.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table
    Module = 0x00,
    /// `TypeRef` table
    TypeRef = 0x01,
    /// `TypeDef` table
    TypeDef = 0x02,
    /// `FieldPtr` table
    FieldPtr = 0x03,
    /// `Field` table
    Field = 0x04,
    /// `MethodPtr` table
    MethodPtr = 0x05,
    /// `MethodDef` table
    MethodDef = 0x06,
    /// `ParamPtr` table
    ParamPtr = 0x07,
    /// `Param` table
    Param = 0x08,
    /// `InterfaceImpl` table
    InterfaceImpl = 0x09,
    /// `MemberRef` table
    MemberRef = 0x0A,
    /// `Constant` table
    Constant = 0x0B,
    /// `CustomAttribute` table
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table
    DeclSecurity = 0x0E,
    /// `ClassLayout` table
    ClassLayout = 0x0F,
    /// `FieldLayout` table
    FieldLayout = 0x10,
    /// `StandAloneSig` table
    StandAloneSig = 0x11,
    /// `EventMap` table
    EventMap = 0x12,
    /// `EventPtr` table
    EventPtr = 0x13,
    /// `Event` table
    Event = 0x14,
    /// `PropertyMap` table
    PropertyMap = 0x15,
    /// `PropertyPtr` table
    PropertyPtr = 0x16,
    /// `Property` table
    Property = 0x17,
    /// `MethodSemantics` table
    MethodSemantics = 0x18,
    /// `MethodImpl` table
    MethodImpl = 0x19,
    /// `ModuleRef` table
    ModuleRef = 0x1A,
    /// `TypeSpec` table
    TypeSpec = 0x1B,
    /// `ImplMap` table
    ImplMap = 0x1C,
    /// `FieldRVA` table
    FieldRva = 0x1D,
    /// `EncLog` table
    EncLog = 0x1E,
    /// `EncMap` table
    EncMap = 0x1F,
    /// `Assembly` table
    Assembly = 0x20,
    /// `AssemblyProcessor` table
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table
    AssemblyOs = 0x22,
    /// `AssemblyRef` table
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table
    AssemblyRefOs = 0x25,
    /// `File` table
    File = 0x26,
    /// `ExportedType` table
    ExportedType = 0x27,
    /// `ManifestResource` table
    ManifestResource = 0x28,
    /// `NestedClass` table
    NestedClass = 0x29,
    /// `GenericParam` table
    GenericParam = 0x2A,
    /// `MethodSpec` table
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table
    GenericParamConstraint = 0x2C,
    /// `Document` table (Portable PDB)
    Document = 0x30,
    /// `MethodDebugInformation` table (Portable PDB)
    MethodDebugInformation = 0x31,
    /// `LocalScope` table (Portable PDB)
    LocalScope = 0x32,
    /// `LocalVariable` table (Portable PDB)
    LocalVariable = 0x33,
    /// `LocalConstant` table (Portable PDB)
    LocalConstant = 0x34,
    /// `ImportScope` table (Portable PDB)
    ImportScope = 0x35,
    /// `StateMachineMethod` table (Portable PDB)
    StateMachineMethod = 0x36,
    /// `CustomDebugInformation` table (Portable PDB)
    CustomDebugInformation = 0x37,
}

impl TableId {
    /// Look up a table by its table number.
    #[must_use]
    pub fn from_index(index: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == index)
    }

    /// The bit of this table in `valid`, `sorted` and `ReferencedTypeSystemTables` masks.
    #[must_use]
    pub fn bit(self) -> u64 {
        1_u64 << (self as u8)
    }

    /// `true` for the Portable PDB debug tables.
    #[must_use]
    pub fn is_debug_table(self) -> bool {
        (self as u8) >= TableId::Document as u8
    }

    /// Position of this table in `TableId::iter()` order, in `0..TableId::COUNT`.
    #[must_use]
    pub fn ordinal(self) -> usize {
        TableId::iter()
            .position(|table| table == self)
            .unwrap_or(TableId::COUNT)
    }
}
