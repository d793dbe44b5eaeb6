use crate::link::LocationLink;

/// Receives each newly confirmed link, once, in discovery order.
pub trait LinkSink {
    fn report(&mut self, link: &LocationLink);
}

/// Prints `[source] <-> [destination]` lines to stdout.
pub struct StdoutSink;

impl LinkSink for StdoutSink {
    fn report(&mut self, link: &LocationLink) {
        println!("{}", link.connection);
    }
}

impl LinkSink for Vec<String> {
    fn report(&mut self, link: &LocationLink) {
        self.push(link.connection.clone());
    }
}

impl<T: LinkSink + ?Sized> LinkSink for &mut T {
    fn report(&mut self, link: &LocationLink) {
        (**self).report(link);
    }
}
