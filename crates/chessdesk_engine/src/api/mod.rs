/* 📖 # Why a single console service?

All HTTP traffic of the console goes through one `HttpService`, which routes
on the path internally. The PAL only ever has one service to start, and every
route shares the same pages, session and error handling.
*/

mod service;

pub use service::ConsoleService;
