use crate::request::BuildRequest;

/// A step that applies settings to a [`BuildRequest`] before it is built.
///
/// Implementations mutate the request in place and must not hold on to it after returning. Wrapping configurators
/// apply their own settings and then delegate to the configurator they wrap.
pub trait Configure {
    fn configure(&self, request: &mut BuildRequest);
}

impl<T: Configure + ?Sized> Configure for &T {
    fn configure(&self, request: &mut BuildRequest) {
        (**self).configure(request)
    }
}

impl<T: Configure + ?Sized> Configure for Box<T> {
    fn configure(&self, request: &mut BuildRequest) {
        (**self).configure(request)
    }
}
