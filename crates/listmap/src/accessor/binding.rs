use crate::{
    adapter::{compare_field, Adapter, AdapterArgs, ComparisonArgs, ContentShape, MethodCallArgs},
    filter::{Comparison, FieldRef, ID_FIELD},
    predicate::{BinaryOp, Constant, Method},
    repository::{Attachment, FileData},
    DataItem, Error, FieldValue, Filter, Property, Result, ValueType,
};

/// Monomorphized access path of one accessor.
pub(crate) trait Binding<T>: Send + Sync {
    fn read(&self, args: &AdapterArgs<'_>, item: &DataItem, entity: &mut T) -> Result<()>;

    fn write(&self, args: &AdapterArgs<'_>, entity: &T, item: &mut DataItem) -> Result<()>;

    fn has_conversion(&self) -> bool {
        true
    }

    fn compare(&self, args: &AdapterArgs<'_>, op: BinaryOp, constant: &Constant) -> Result<Filter> {
        Err(Error::unsupported_predicate(format!(
            "`{}::{} {op} {constant:?}` cannot be translated",
            args.entity, args.property
        )))
    }

    fn is_null(&self, field: &str, negated: bool) -> Result<Filter> {
        let field = FieldRef::new(field);
        Ok(if negated {
            Comparison::is_not_null(field)
        } else {
            Comparison::is_null(field)
        }
        .into())
    }

    fn method_call(&self, args: &AdapterArgs<'_>, method: Method, argument: &Constant) -> Result<Filter> {
        Err(Error::unsupported_predicate(format!(
            "`{}::{}.{method}({argument:?})` cannot be translated",
            args.entity, args.property
        )))
    }
}

fn constant_of<'a, P: 'static>(args: &AdapterArgs<'_>, constant: &'a Constant) -> Result<&'a P> {
    constant.downcast_ref::<P>().ok_or_else(|| {
        crate::err!("constant {constant:?} does not have the property's type")
            .context(Error::property_access(args.entity, args.property))
    })
}

/// A property converted by an adapter.
pub(crate) struct Bound<T, P, A> {
    pub(crate) property: Property<T, P>,
    pub(crate) adapter: A,
}

impl<T, P, A> Binding<T> for Bound<T, P, A>
where
    T: 'static,
    P: 'static,
    A: Adapter<P>,
{
    fn read(&self, args: &AdapterArgs<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        let raw = item.get(args.field).cloned().unwrap_or_default();
        let value = self.adapter.to_property(args, raw)?;
        self.property.set(entity, value);
        Ok(())
    }

    fn write(&self, args: &AdapterArgs<'_>, entity: &T, item: &mut DataItem) -> Result<()> {
        let raw = self.adapter.to_field(args, self.property.get(entity))?;
        let merged = item.take(args.field).merge(raw);
        item.set(args.field, merged);
        Ok(())
    }

    fn has_conversion(&self) -> bool {
        self.adapter.has_conversion()
    }

    fn compare(&self, args: &AdapterArgs<'_>, op: BinaryOp, constant: &Constant) -> Result<Filter> {
        let value = constant_of::<P>(args, constant)?;

        match self.adapter.comparison() {
            Some(hook) => hook.eval_comparison(&ComparisonArgs {
                args: *args,
                op,
                value,
            }),
            None => {
                let raw = self.adapter.to_field(args, value)?;
                compare_field(FieldRef::new(args.field), op, None, raw)
            }
        }
    }

    fn method_call(&self, args: &AdapterArgs<'_>, method: Method, argument: &Constant) -> Result<Filter> {
        match self.adapter.method_call() {
            Some(hook) => hook.eval_method_call(&MethodCallArgs {
                args: *args,
                method,
                argument,
            }),
            None => Err(Error::unsupported_predicate(format!(
                "`{}::{}.{method}({argument:?})` has no translation",
                args.entity, args.property
            ))),
        }
    }
}

/// The store-assigned integer id. It is read from the item itself and never
/// written as a field.
pub(crate) struct IdBinding<T> {
    pub(crate) property: Property<T, i32>,
}

impl<T: 'static> Binding<T> for IdBinding<T> {
    fn read(&self, _args: &AdapterArgs<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        let id = match item.id {
            Some(id) => id,
            None => match item.get(ID_FIELD) {
                Some(value) => i32::try_from(value.clone())?,
                None => 0,
            },
        };
        self.property.set(entity, id);
        Ok(())
    }

    fn write(&self, _args: &AdapterArgs<'_>, entity: &T, item: &mut DataItem) -> Result<()> {
        match *self.property.get(entity) {
            0 => {}
            id => item.id = Some(id),
        }
        Ok(())
    }

    fn compare(&self, args: &AdapterArgs<'_>, op: BinaryOp, constant: &Constant) -> Result<Filter> {
        let id = *constant_of::<i32>(args, constant)?;
        compare_field(
            FieldRef::new(ID_FIELD),
            op,
            Some(ValueType::Counter),
            FieldValue::Integer(id as i64),
        )
    }

    fn is_null(&self, _field: &str, negated: bool) -> Result<Filter> {
        let field = FieldRef::new(ID_FIELD);
        Ok(if negated {
            Comparison::is_not_null(field)
        } else {
            Comparison::is_null(field)
        }
        .into())
    }
}

/// The attachments of an item.
pub(crate) struct AttachmentsBinding<T, S> {
    pub(crate) property: Property<T, Vec<S>>,
}

impl<T: 'static, S: ContentShape> Binding<T> for AttachmentsBinding<T, S> {
    fn read(&self, _args: &AdapterArgs<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        let Some(attachments) = &item.attachments else {
            return Ok(());
        };
        let values = attachments
            .iter()
            .map(|attachment| S::from_content(attachment.name.clone(), attachment.content.clone()))
            .collect::<Result<Vec<_>>>()?;
        self.property.set(entity, values);
        Ok(())
    }

    fn write(&self, _args: &AdapterArgs<'_>, entity: &T, item: &mut DataItem) -> Result<()> {
        let attachments = self
            .property
            .get(entity)
            .iter()
            .map(|value| {
                let (name, content) = value.to_content()?;
                Ok(Attachment { name, content })
            })
            .collect::<Result<Vec<_>>>()?;
        item.attachments = Some(attachments);
        Ok(())
    }
}

/// The primary file of a document item.
pub(crate) struct FileBinding<T, S> {
    pub(crate) property: Property<T, Option<S>>,
}

impl<T: 'static, S: ContentShape> Binding<T> for FileBinding<T, S> {
    fn read(&self, _args: &AdapterArgs<'_>, item: &DataItem, entity: &mut T) -> Result<()> {
        let Some(file) = &item.file else {
            return Ok(());
        };
        let value = S::from_content(file.name.clone(), file.content.clone())?;
        self.property.set(entity, Some(value));
        Ok(())
    }

    fn write(&self, _args: &AdapterArgs<'_>, entity: &T, item: &mut DataItem) -> Result<()> {
        item.file = match self.property.get(entity) {
            Some(value) => {
                let (name, content) = value.to_content()?;
                Some(FileData { name, content })
            }
            None => None,
        };
        Ok(())
    }
}
