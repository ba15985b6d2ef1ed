use crate::jvm::class_file::{AttributeLike, BytecodeArray, Code, ConstantPool, Method};
use crate::jvm::{
    BaseType, Error as JvmError, FieldType, MethodAccessFlags, MethodDescriptor, ParseDescriptor,
};
use crate::strip::Error;

// The only instructions a stub body ever contains
const ACONST_NULL: u8 = 0x01;
const ICONST_0: u8 = 0x03;
const LCONST_0: u8 = 0x09;
const FCONST_0: u8 = 0x0b;
const DCONST_0: u8 = 0x0e;
const IRETURN: u8 = 0xac;
const LRETURN: u8 = 0xad;
const FRETURN: u8 = 0xae;
const DRETURN: u8 = 0xaf;
const ARETURN: u8 = 0xb0;
const RETURN: u8 = 0xb1;

/// Replace a method's body with a minimal verifiable stub
///
/// The stub pushes the canonical default value for the method's return type
/// and immediately returns it. `abstract` and `native` methods have no body
/// and pass through untouched. Everything else about the method (descriptor,
/// declared exceptions, generic signature, annotations) is preserved, so
/// callers compiled against the original stay binary-compatible.
///
/// Verification metadata is re-established from scratch rather than copied:
/// the stub is a single basic block with no branches, so no stack map frames
/// are required, the operand stack never grows beyond the width of the
/// pushed value, and the local variable table only has to fit the parameters
/// (and `this`) that the body no longer reads.
pub fn stub_method(
    class_name: &str,
    method: &mut Method,
    constants: &mut ConstantPool,
) -> Result<(), Error> {
    if method
        .access_flags
        .intersects(MethodAccessFlags::ABSTRACT | MethodAccessFlags::NATIVE)
    {
        return Ok(());
    }

    let descriptor_string = constants.utf8(method.descriptor_index)?.to_owned();
    let descriptor = MethodDescriptor::parse(&descriptor_string).map_err(|err| {
        JvmError::BadDescriptor {
            descriptor: descriptor_string.clone(),
            message: err.to_string(),
        }
    })?;
    let has_this_param = !method.access_flags.contains(MethodAccessFlags::STATIC);

    let code = stub_code(&descriptor, has_this_param);
    let replacement = constants.get_attribute(code)?;

    let code_attribute = method.attributes.iter_mut().find(|attribute| {
        matches!(constants.utf8(attribute.name_index), Ok(name) if name == Code::NAME)
    });
    match code_attribute {
        Some(attribute) => {
            *attribute = replacement;
            Ok(())
        }
        None => Err(Error::MissingCode {
            class: class_name.to_owned(),
            method: constants.utf8(method.name_index)?.to_owned(),
        }),
    }
}

/// Build the stub `Code` body for a method of the given shape
fn stub_code(descriptor: &MethodDescriptor, has_this_param: bool) -> Code {
    let mut bytecode = vec![];
    let max_stack: u16 = match &descriptor.return_type {
        None => {
            bytecode.push(RETURN);
            0
        }
        Some(FieldType::Base(BaseType::Long)) => {
            bytecode.push(LCONST_0);
            bytecode.push(LRETURN);
            2
        }
        Some(FieldType::Base(BaseType::Double)) => {
            bytecode.push(DCONST_0);
            bytecode.push(DRETURN);
            2
        }
        Some(FieldType::Base(BaseType::Float)) => {
            bytecode.push(FCONST_0);
            bytecode.push(FRETURN);
            1
        }
        // `boolean`, `byte`, `char`, `short`, and `int` all return through
        // an `int` 0
        Some(FieldType::Base(_)) => {
            bytecode.push(ICONST_0);
            bytecode.push(IRETURN);
            1
        }
        Some(FieldType::Object(_) | FieldType::Array(_)) => {
            bytecode.push(ACONST_NULL);
            bytecode.push(ARETURN);
            1
        }
    };

    Code {
        max_stack,
        max_locals: descriptor.parameter_length(has_this_param) as u16,
        bytecode: BytecodeArray(bytecode),
        exception_table: vec![],
        attributes: vec![],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stub_for(descriptor: &str, has_this_param: bool) -> Code {
        let descriptor = MethodDescriptor::parse(descriptor).unwrap();
        stub_code(&descriptor, has_this_param)
    }

    #[test]
    fn void_stub_is_a_bare_return() {
        let code = stub_for("()V", false);
        assert_eq!(code.bytecode.0, vec![RETURN]);
        assert_eq!(code.max_stack, 0);
        assert_eq!(code.max_locals, 0);
    }

    #[test]
    fn integral_returns_push_int_zero() {
        for descriptor in ["()Z", "()B", "()C", "()S", "()I"] {
            let code = stub_for(descriptor, false);
            assert_eq!(code.bytecode.0, vec![ICONST_0, IRETURN]);
            assert_eq!(code.max_stack, 1);
        }
    }

    #[test]
    fn wide_returns_need_two_stack_slots() {
        let long = stub_for("()J", false);
        assert_eq!(long.bytecode.0, vec![LCONST_0, LRETURN]);
        assert_eq!(long.max_stack, 2);

        let double = stub_for("()D", false);
        assert_eq!(double.bytecode.0, vec![DCONST_0, DRETURN]);
        assert_eq!(double.max_stack, 2);
    }

    #[test]
    fn float_stub() {
        let code = stub_for("()F", false);
        assert_eq!(code.bytecode.0, vec![FCONST_0, FRETURN]);
        assert_eq!(code.max_stack, 1);
    }

    #[test]
    fn references_and_arrays_return_null() {
        for descriptor in ["()Ljava/lang/String;", "()[I", "()[[Ljava/lang/Object;"] {
            let code = stub_for(descriptor, false);
            assert_eq!(code.bytecode.0, vec![ACONST_NULL, ARETURN]);
            assert_eq!(code.max_stack, 1);
        }
    }

    #[test]
    fn locals_still_fit_the_parameters() {
        // Instance method: `this` + int + long + reference = 1 + 1 + 2 + 1
        let code = stub_for("(IJLjava/lang/String;)V", true);
        assert_eq!(code.max_locals, 5);

        // Static variant loses the `this` slot
        let code = stub_for("(IJLjava/lang/String;)V", false);
        assert_eq!(code.max_locals, 4);
    }

    #[test]
    fn stub_has_no_handlers_and_no_frames() {
        let code = stub_for("(DD)D", true);
        assert!(code.exception_table.is_empty());
        assert!(code.attributes.is_empty());
    }
}
