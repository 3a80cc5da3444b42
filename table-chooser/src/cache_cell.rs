use std::cell::RefCell;

/// Memoizes the last result of a computation, keyed by its arguments.
pub struct CacheCell<Args, T> {
    last: RefCell<Option<(Args, T)>>,
}

impl<Args, T> CacheCell<Args, T> {
    pub fn new() -> CacheCell<Args, T> {
        CacheCell {
            last: RefCell::new(None),
        }
    }
}

impl<Args, T> Default for CacheCell<Args, T> {
    fn default() -> Self {
        CacheCell::new()
    }
}

impl<Args: PartialEq, T: Clone> CacheCell<Args, T> {
    pub fn cache(&self, args: Args, init: impl FnOnce(&Args) -> T) -> T {
        match self.try_cache(args, |args| Ok::<_, std::convert::Infallible>(init(args))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like `cache`, but a failed computation is not memoized.
    pub fn try_cache<E>(
        &self,
        args: Args,
        init: impl FnOnce(&Args) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut last = self.last.borrow_mut();
        if let Some((last_args, last_value)) = &*last {
            if *last_args == args {
                return Ok(last_value.clone());
            }
        }

        let value = init(&args)?;
        *last = Some((args, value.clone()));
        Ok(value)
    }
}
