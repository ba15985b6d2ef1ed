use crate::jvm::class_file::ClassFile;
use crate::strip::{member, stub_method, Error, Settings};

/// Rewrite one class into its API-only form, in place
///
/// Fields and methods are filtered through the member policy, every
/// surviving method with a body gets it replaced by a stub, and the static
/// initializer disappears unconditionally. The class's own identity (name,
/// version, access flags, superclass, interfaces, class-level attributes)
/// is never altered.
///
/// On error the class must be discarded: a half-stripped class is not worth
/// keeping, and the jar loop treats the whole entry as failed.
pub fn strip_class(class: &mut ClassFile, settings: &Settings) -> Result<(), Error> {
    let class_name = class.this_class_name()?.to_owned();

    class
        .fields
        .retain(|field| member::keep_field(field.access_flags, settings.remove_non_public));

    let methods = std::mem::take(&mut class.methods);
    let mut kept = Vec::with_capacity(methods.len());
    for mut method in methods {
        let name = class.constants.utf8(method.name_index)?;
        if !member::keep_method(name, method.access_flags, settings.remove_non_public) {
            continue;
        }
        stub_method(&class_name, &mut method, &mut class.constants)?;
        kept.push(method);
    }
    class.methods = kept;

    Ok(())
}
