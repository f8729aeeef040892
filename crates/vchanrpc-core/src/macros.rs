/// Asserts that the traits support dynamic dispatch.
#[macro_export]
macro_rules! assert_obj_safe {
    ($($xs:path),+ $(,)?) => {
        $(const _: Option<&dyn $xs> = None;)+
    };
}

/// Returns a "not enough bytes" [`DecodeError`](crate::DecodeError) early when the buffer is too short.
///
/// ```ignore
/// ensure_size!(ctx: "DnD capabilities", in: bytes, size: 8);
/// ```
#[macro_export]
macro_rules! ensure_size {
    (ctx: $ctx:expr, in: $buf:ident, size: $expected:expr) => {{
        let received = $buf.len();
        let expected = $expected;
        if !(received >= expected) {
            return Err(<$crate::DecodeError as $crate::DecodeErrorExt>::not_enough_bytes(
                $ctx, received, expected,
            ));
        }
    }};
}
