//! Coercion and ABI encoding of constructor arguments.

use {
    crate::domain::{deployment, eth},
    alloy_dyn_abi::{DynSolType, DynSolValue, Specifier as _},
    anyhow::{Context as _, bail},
};

/// Builds the input of a creation transaction: the artifact's creation
/// bytecode followed by the ABI encoding of the constructor arguments.
///
/// Arguments are given as strings and coerced against the parameter types
/// declared by the artifact's constructor. Mismatched arity or values that
/// do not parse as their declared type are errors, raised before anything is
/// signed or sent.
pub fn encode(artifact: &deployment::Artifact, args: &[String]) -> anyhow::Result<eth::Bytes> {
    let params = match &artifact.abi.constructor {
        Some(constructor) => constructor.inputs.as_slice(),
        None if args.is_empty() => return Ok(artifact.bytecode.clone()),
        None => bail!(
            "artifact {} has no constructor, but {} constructor arguments were given",
            artifact.name,
            args.len()
        ),
    };
    if params.len() != args.len() {
        bail!(
            "artifact {} constructor expects {} arguments, got {}",
            artifact.name,
            params.len(),
            args.len()
        );
    }

    let values = params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .with_context(|| format!("unsupported constructor parameter type {}", param.ty))?;
            ty.coerce_str(arg).with_context(|| {
                format!("constructor argument {arg:?} does not parse as {}", param.ty)
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut input = artifact.bytecode.to_vec();
    input.extend(DynSolValue::Tuple(values).abi_encode_params());
    Ok(input.into())
}
