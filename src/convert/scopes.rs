//! Serialization of a method's lexical scope tree into `LocalScope`, `LocalVariable` and
//! `LocalConstant` rows.
//!
//! A tree is validated completely before any row is written. Its scopes are then emitted in the
//! order of the sorted `LocalScope` table: by start offset, longer scopes first, ties kept in
//! pre-order so that an enclosing scope precedes an inner scope with the same range. Every
//! scope row points at the first variable and constant row it owns; the rows of a scope follow
//! the rows of all scopes written before it, which keeps each scope's lists contiguous.

use std::cmp::Reverse;

use crate::{
    convert::options::{FeatureGate, UnsupportedFeature},
    metadata::{
        builder::{ImportScopeHandle, PdbBuilder},
        tables::TableId,
        token::Token,
    },
    symbols::LocalScope,
    Error, Result,
};

/// Writes scope trees, sharing one root `ImportScope` row across all methods.
#[derive(Debug, Default)]
pub struct ScopeSerializer {
    import_scope: Option<ImportScopeHandle>,
}

impl ScopeSerializer {
    /// Create a serializer that has not written any rows yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the scope tree of `method`.
    ///
    /// The root scope only delimits the method body: it must not declare anything and is not
    /// written itself. Its children are checked against it and serialized together.
    ///
    /// # Errors
    /// Returns [`crate::Error::RootScope`] if the root declares variables, constants or
    /// namespaces, and the errors of [`ScopeSerializer::serialize`].
    pub fn serialize_root(
        &mut self,
        builder: &mut PdbBuilder,
        gate: &mut FeatureGate,
        method: Token,
        root: &LocalScope,
    ) -> Result<()> {
        if !root.variables.is_empty() || !root.constants.is_empty() || !root.namespaces.is_empty()
        {
            return Err(Error::RootScope(method));
        }
        check_range(method, root)?;

        let mut scopes = Vec::new();
        let mut previous = None;
        for child in &root.children {
            check_child(method, root, child, previous)?;
            collect(method, child, root.end, &mut scopes)?;
            previous = Some(child);
        }

        self.emit(builder, gate, method, scopes)
    }

    /// Write `scope` and its descendants.
    ///
    /// `parent_end` is the end offset of the enclosing scope; `scope` must not extend past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::ScopeRange`] for a scope that ends before it starts,
    /// [`crate::Error::ScopeNesting`] for a child that escapes its parent or overlaps its
    /// previous sibling, and [`crate::Error::Unsupported`] when an unsupported feature is met
    /// under the reject policy.
    pub fn serialize(
        &mut self,
        builder: &mut PdbBuilder,
        gate: &mut FeatureGate,
        method: Token,
        scope: &LocalScope,
        parent_end: u32,
    ) -> Result<()> {
        let mut scopes = Vec::new();
        collect(method, scope, parent_end, &mut scopes)?;

        self.emit(builder, gate, method, scopes)
    }

    /// Write the rows of validated scopes in table order.
    fn emit(
        &mut self,
        builder: &mut PdbBuilder,
        gate: &mut FeatureGate,
        method: Token,
        mut scopes: Vec<&LocalScope>,
    ) -> Result<()> {
        scopes.sort_by_key(|scope| (scope.start, Reverse(scope.end - scope.start)));

        for scope in scopes {
            let import_scope = self.import_scope(builder);
            let variable_list = builder.next_row(TableId::LocalVariable);
            let constant_list = builder.next_row(TableId::LocalConstant);
            let row = builder.add_local_scope(
                method.row(),
                import_scope,
                variable_list,
                constant_list,
                scope.start,
                scope.end - scope.start,
            );
            tracing::trace!(
                %method,
                row,
                start = scope.start,
                end = scope.end,
                variables = scope.variables.len(),
                constants = scope.constants.len(),
                "added local scope"
            );

            for variable in &scope.variables {
                let name = builder.add_string(&variable.name);
                builder.add_local_variable(variable.attributes.bits(), variable.index, name);
            }

            for constant in &scope.constants {
                let name = builder.add_string(&constant.name);
                let signature = match constant.value.signature() {
                    Some(signature) => builder.add_blob(&signature),
                    None => {
                        gate.encounter(UnsupportedFeature::ConstantValue, Some(method))?;
                        builder.add_blob(&[])
                    }
                };
                builder.add_local_constant(name, signature);
            }

            if !scope.namespaces.is_empty() {
                gate.encounter(UnsupportedFeature::ImportScopes, Some(method))?;
            }
        }

        Ok(())
    }

    /// The shared root import scope, added on first use.
    fn import_scope(&mut self, builder: &mut PdbBuilder) -> ImportScopeHandle {
        *self.import_scope.get_or_insert_with(|| {
            let imports = builder.add_blob(&[]);
            builder.add_import_scope(None, imports)
        })
    }
}

/// Validate `scope` and its descendants, appending them to `scopes` in pre-order.
fn collect<'s>(
    method: Token,
    scope: &'s LocalScope,
    parent_end: u32,
    scopes: &mut Vec<&'s LocalScope>,
) -> Result<()> {
    check_range(method, scope)?;
    if scope.end > parent_end {
        return Err(Error::ScopeNesting {
            method,
            start: scope.start,
            end: scope.end,
            bound_start: scope.start,
            bound_end: parent_end,
        });
    }

    scopes.push(scope);

    let mut previous = None;
    for child in &scope.children {
        check_child(method, scope, child, previous)?;
        collect(method, child, scope.end, scopes)?;
        previous = Some(child);
    }

    Ok(())
}

fn check_range(method: Token, scope: &LocalScope) -> Result<()> {
    if scope.end < scope.start {
        return Err(Error::ScopeRange {
            method,
            start: scope.start,
            end: scope.end,
        });
    }

    Ok(())
}

/// Check `child` against its parent and its previous sibling.
fn check_child(
    method: Token,
    parent: &LocalScope,
    child: &LocalScope,
    previous: Option<&LocalScope>,
) -> Result<()> {
    check_range(method, child)?;

    let bound = if child.start < parent.start || child.end > parent.end {
        parent
    } else if let Some(sibling) = previous.filter(|sibling| child.start < sibling.end) {
        sibling
    } else {
        return Ok(());
    };

    Err(Error::ScopeNesting {
        method,
        start: child.start,
        end: child.end,
        bound_start: bound.start,
        bound_end: bound.end,
    })
}
