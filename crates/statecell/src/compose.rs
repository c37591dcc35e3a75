//! Right-to-left function composition
//!
//! `compose(f, g, h)` behaves like `|x| f(g(h(x)))`: the rightmost function
//! receives the input and each result feeds the function to its left.
//! Composing nothing gives the identity function, composing one function
//! gives that function back.

/// A boxed unary function that can be called many times
pub type BoxedFn<'a, T> = Box<dyn Fn(T) -> T + 'a>;

/// A boxed unary function that is called once
pub type BoxedFnOnce<'a, T> = Box<dyn FnOnce(T) -> T + 'a>;

/// Compose a list of functions over one type
pub fn compose<'a, T: 'a>(mut funcs: Vec<BoxedFn<'a, T>>) -> BoxedFn<'a, T> {
    if funcs.len() <= 1 {
        return match funcs.pop() {
            Some(f) => f,
            None => Box::new(|x| x),
        };
    }
    Box::new(move |x| funcs.iter().rev().fold(x, |acc, f| f(acc)))
}

/// Compose a list of one-shot functions, e.g. middleware links or store enhancers
pub fn compose_once<'a, T: 'a>(mut funcs: Vec<BoxedFnOnce<'a, T>>) -> BoxedFnOnce<'a, T> {
    if funcs.len() <= 1 {
        return match funcs.pop() {
            Some(f) => f,
            None => Box::new(|x| x),
        };
    }
    Box::new(move |x| funcs.into_iter().rev().fold(x, |acc, f| f(acc)))
}

/// Compose functions whose types differ from link to link
///
/// ```
/// use statecell::compose;
///
/// let describe = compose!(
///     |n: usize| format!("{n} bytes"),
///     |bytes: Vec<u8>| bytes.len(),
///     |s: String| s.into_bytes(),
/// );
/// assert_eq!(describe("abc".to_string()), "3 bytes");
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        |x| x
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {{
        let f = $f;
        let g = $crate::compose!($($rest),+);
        move |x| f(g(x))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_applies_right_to_left() {
        let f: BoxedFn<i32> = Box::new(|x| x * 2);
        let g: BoxedFn<i32> = Box::new(|x| x + 3);
        let h: BoxedFn<i32> = Box::new(|x| x - 1);
        let composed = compose(vec![f, g, h]);
        assert_eq!(composed(5), (5 - 1 + 3) * 2);
    }

    #[test]
    fn test_compose_empty_is_identity() {
        let identity = compose::<String>(Vec::new());
        assert_eq!(identity("same".to_string()), "same");
    }

    #[test]
    fn test_compose_single_is_itself() {
        let composed = compose(vec![Box::new(|x: i32| x * 10) as BoxedFn<i32>]);
        assert_eq!(composed(4), 40);
    }

    #[test]
    fn test_compose_once_moves_values() {
        let suffix = String::from("!");
        let first: BoxedFnOnce<String> = Box::new(move |s| s + &suffix);
        let second: BoxedFnOnce<String> = Box::new(|s| s.to_uppercase());
        assert_eq!(compose_once(vec![first, second])("hi".to_string()), "HI!");
    }

    #[test]
    fn test_compose_macro() {
        let f = |x: i32| x * 2;
        let g = |x: i32| x + 1;
        let h = |x: i32| x * x;
        assert_eq!(compose!(f, g, h)(3), f(g(h(3))));
        assert_eq!(compose!(f)(3), 6);
        assert_eq!(compose!()(3), 3);
    }
}
