/// `impl Future<Output = $t> + Send`, for trait methods that must return a `Send` future.
macro_rules! future_send {
    ($t:ty) => {
        impl ::core::future::Future<Output = $t> + Send
    };
}

pub(crate) use future_send;
