use crate::{
    accessor::Scope,
    filter::{CompareOp, Comparison, FieldRef, Operand, ID_FIELD},
    predicate::Expr,
    Entity, EntityMap, Error, FieldName, Filter, Parameters, Predicate, PropertyAccessor, Result,
};

use tracing::debug;

/// A translated predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    /// Filter sent to the store. `None` fetches every item.
    pub native: Option<Filter>,

    /// Filter applied in memory to the fetched items. When set it is the
    /// complete predicate, so `native` only narrows the fetch.
    pub local: Option<Filter>,

    /// Fields both filters compare against.
    pub fields: Vec<FieldName>,
}

impl QueryPlan {
    /// Splits a native filter that may hold `Local` subtrees.
    pub fn from_filter(filter: Filter) -> Self {
        let fields = filter.field_names();

        if !filter.has_local() {
            return Self {
                native: Some(filter),
                local: None,
                fields,
            };
        }

        let local = filter.without_local_markers();
        let native = match filter {
            Filter::And(operands) => {
                Filter::and_from_vec(operands.into_iter().filter(|f| !f.has_local()).collect())
            }
            _ => None,
        };
        Self {
            native,
            local: Some(local),
            fields,
        }
    }

    pub fn is_local(&self) -> bool {
        self.local.is_some()
    }
}

/// Translates `predicate` into native filters against the fields of `map`.
///
/// Every property is resolved through the accessor bound to it, so two
/// properties over one field translate by their own adapters. An unmapped
/// property, an unsupported method call or a negation the store cannot
/// express fails the translation; no partial filter is ever returned.
pub fn translate<T: Entity>(map: &EntityMap<T>, predicate: &Predicate<T>) -> Result<QueryPlan> {
    if let Expr::Value(true) = predicate.expr() {
        return Ok(QueryPlan::default());
    }

    let parameters = Parameters::default();
    let translator = Translator {
        map,
        scope: Scope {
            parameters: &parameters,
            collection: None,
        },
    };

    let plan = QueryPlan::from_filter(translator.lower(predicate.expr())?);

    debug!(
        entity = T::NAME,
        native = ?plan.native,
        local = plan.is_local(),
        "translated predicate"
    );
    Ok(plan)
}

struct Translator<'a, T> {
    map: &'a EntityMap<T>,
    scope: Scope<'a>,
}

impl<T: Entity> Translator<'_, T> {
    fn lower(&self, expr: &Expr) -> Result<Filter> {
        Ok(match expr {
            Expr::And(operands) => {
                let operands = operands.iter().map(|e| self.lower(e)).collect::<Result<Vec<_>>>()?;
                Filter::and_from_vec(operands).unwrap_or_else(always)
            }
            Expr::Or(operands) => {
                let operands = operands.iter().map(|e| self.lower(e)).collect::<Result<Vec<_>>>()?;
                Filter::or_from_vec(operands).unwrap_or_else(never)
            }
            Expr::Not(expr) => negate(self.lower(expr)?)?,
            Expr::Compare(cmp) => self
                .accessor(cmp.property)?
                .compare(self.scope, cmp.op, &cmp.constant)?,
            Expr::IsNull(e) => self.accessor(e.property)?.is_null(e.negated)?,
            Expr::Method(call) => self
                .accessor(call.property)?
                .method_call(self.scope, call.method, &call.argument)?,
            Expr::Value(true) => always(),
            Expr::Value(false) => never(),
        })
    }

    fn accessor(&self, property: &str) -> Result<&PropertyAccessor<T>> {
        self.map.accessor(property).ok_or_else(|| {
            Error::unsupported_predicate(format!(
                "property `{}::{property}` is not mapped",
                T::NAME
            ))
        })
    }
}

/// The built-in id is never null.
fn always() -> Filter {
    Comparison::is_not_null(FieldRef::new(ID_FIELD)).into()
}

fn never() -> Filter {
    Comparison::is_null(FieldRef::new(ID_FIELD)).into()
}

/// Returns the filter matching exactly the items `filter` rejects.
fn negate(filter: Filter) -> Result<Filter> {
    Ok(match filter {
        Filter::And(operands) => Filter::Or(operands.into_iter().map(negate).collect::<Result<_>>()?),
        Filter::Or(operands) => Filter::And(operands.into_iter().map(negate).collect::<Result<_>>()?),
        Filter::Local(inner) => Filter::local(negate(*inner)?),
        Filter::Compare(cmp) => negate_comparison(cmp)?,
    })
}

fn negate_comparison(mut cmp: Comparison) -> Result<Filter> {
    match cmp.op {
        // A null field fails both a relational comparison and its opposite
        op if op.is_relational() => {
            let null = Comparison::is_null(cmp.field.clone());
            cmp.op = op.negate().unwrap_or(op);
            Ok(Filter::or(cmp, null))
        }
        CompareOp::In => {
            let Operand::List(ty, values) = cmp.operand else {
                return Err(Error::unsupported_predicate(format!(
                    "`In` on `{}` has no value list",
                    cmp.field.name
                )));
            };
            let operands = values
                .into_iter()
                .map(|value| {
                    Filter::from(Comparison::neq(
                        cmp.field.clone(),
                        crate::filter::TypedValue::new(ty, value),
                    ))
                })
                .collect();
            Ok(Filter::and_from_vec(operands).unwrap_or_else(always))
        }
        op => match op.negate() {
            Some(negated) => {
                cmp.op = negated;
                Ok(cmp.into())
            }
            None => Err(Error::unsupported_predicate(format!(
                "`{op}` on `{}` cannot be negated",
                cmp.field.name
            ))),
        },
    }
}
