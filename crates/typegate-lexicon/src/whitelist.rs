//! Names that never need verification.
//!
//! Primitive aliases, common standard-library types and framework scaffolding
//! that every agent already knows. The lists are filters only; they say
//! nothing about whether a name is actually a type.

use crate::dialect::Dialect;
use std::collections::HashSet;

/// Known in every dialect.
const SHARED: &[&str] = &[
    "String", "Object", "Boolean", "Number", "Array", "Error", "Math", "Date", "Map", "Set",
    "Symbol", "Function", "Console", "Exception", "Type", "Stream", "Buffer",
    "Iterator", "Promise", "Task", "List", "Dictionary", "JSON", "URL", "Uri", "Regex",
    "RegExp",
];

const CSHARP: &[&str] = &[
    // primitives and BCL value types
    "Int16", "Int32", "Int64", "UInt16", "UInt32", "UInt64", "Byte", "SByte", "Char",
    "Single", "Double", "Decimal", "IntPtr", "UIntPtr", "Half", "DateTime", "DateTimeOffset",
    "DateOnly", "TimeOnly", "TimeSpan", "Guid", "Nullable", "Void", "Enum", "ValueType",
    "Tuple", "ValueTuple", "KeyValuePair", "Span", "ReadOnlySpan", "Memory", "ReadOnlyMemory",
    "Version", "Random", "Lazy", "WeakReference",
    // collections
    "IList", "ICollection", "IEnumerable", "IEnumerator", "IReadOnlyList",
    "IReadOnlyCollection", "IReadOnlyDictionary", "IDictionary", "HashSet", "ISet",
    "SortedSet", "SortedDictionary", "SortedList", "LinkedList", "Queue", "Stack",
    "ConcurrentDictionary", "ConcurrentQueue", "ConcurrentBag", "ImmutableArray",
    "ImmutableList", "ImmutableDictionary", "IQueryable", "IAsyncEnumerable",
    "ObservableCollection", "BitArray",
    // delegates and async
    "Func", "Action", "Predicate", "Comparison", "EventHandler", "EventArgs", "ValueTask",
    "TaskCompletionSource", "CancellationToken", "CancellationTokenSource", "Thread",
    "ThreadPool", "SemaphoreSlim", "Monitor", "Interlocked", "Parallel", "Timer",
    // exceptions
    "ArgumentException", "ArgumentNullException", "ArgumentOutOfRangeException",
    "InvalidOperationException", "NotImplementedException", "NotSupportedException",
    "NullReferenceException", "KeyNotFoundException", "IndexOutOfRangeException",
    "FormatException", "TimeoutException", "IOException", "FileNotFoundException",
    "UnauthorizedAccessException", "OperationCanceledException", "TaskCanceledException",
    "AggregateException", "ObjectDisposedException", "HttpRequestException",
    // interfaces and utilities
    "IDisposable", "IAsyncDisposable", "IEquatable", "IComparable", "IComparer",
    "IEqualityComparer", "IFormattable", "ICloneable", "IServiceProvider", "Convert",
    "Activator", "Environment", "GC", "Debug", "Trace", "Stopwatch", "StringBuilder",
    "StringComparison", "StringComparer", "Encoding", "Path", "File", "Directory",
    "FileInfo", "DirectoryInfo", "MemoryStream", "FileStream", "StreamReader",
    "StreamWriter", "TextReader", "TextWriter", "BinaryReader", "BinaryWriter",
    "JsonSerializer", "JsonSerializerOptions", "JsonElement", "JsonDocument", "HttpClient",
    "HttpResponseMessage", "HttpRequestMessage", "HttpStatusCode", "HttpContent",
    "CultureInfo", "Attribute", "Assembly", "Linq", "Enumerable", "Queryable", "Expression",
    "BigInteger",
    // Microsoft.Extensions / ASP.NET / EF scaffolding
    "ILogger", "ILoggerFactory", "LogLevel", "IConfiguration", "IOptions", "IHost",
    "IHostBuilder", "IHostedService", "BackgroundService", "IServiceCollection",
    "IServiceScope", "IApplicationBuilder", "IWebHostEnvironment", "WebApplication",
    "WebApplicationBuilder", "Controller", "ControllerBase", "ApiController", "Route",
    "HttpGet", "HttpPost", "HttpPut", "HttpDelete", "HttpPatch", "FromBody", "FromQuery",
    "FromRoute", "FromServices", "IActionResult", "ActionResult", "IResult", "Results",
    "HttpContext", "DbContext", "DbSet", "DbContextOptions", "ModelBuilder",
    "Required", "MaxLength", "StringLength", "Obsolete", "Serializable",
    "Flags", "Program", "Startup",
    // test frameworks
    "Assert", "Fact", "Theory", "InlineData", "TestMethod", "TestClass", "TestInitialize",
    "TestCase", "SetUp", "TearDown", "Mock", "It", "Times",
];

const TYPESCRIPT: &[&str] = &[
    // built-ins and utility types
    "BigInt", "WeakMap", "WeakSet", "WeakRef", "ArrayBuffer", "SharedArrayBuffer",
    "DataView", "Int8Array", "Uint8Array", "Uint8ClampedArray", "Int16Array",
    "Uint16Array", "Int32Array", "Uint32Array", "Float32Array", "Float64Array",
    "TypeError", "RangeError", "SyntaxError", "ReferenceError", "EvalError", "URIError",
    "AggregateError", "Reflect", "Proxy", "Intl", "Atomics", "Partial", "Required",
    "Readonly", "Record", "Pick", "Omit", "Exclude", "Extract", "NonNullable",
    "ReturnType", "Parameters", "ConstructorParameters", "InstanceType", "ThisType",
    "Awaited", "Uppercase", "Lowercase", "Capitalize", "Uncapitalize", "ReadonlyArray",
    "ReadonlyMap", "ReadonlySet", "PromiseLike", "ArrayLike", "Iterable",
    "IterableIterator", "AsyncIterable", "AsyncIterableIterator", "AsyncIterator",
    "Generator", "AsyncGenerator", "PropertyKey", "TemplateStringsArray",
    // DOM and web platform
    "Window", "Document", "Element", "HTMLElement", "HTMLDivElement", "HTMLInputElement",
    "HTMLButtonElement", "HTMLFormElement", "HTMLCanvasElement", "NodeList",
    "MouseEvent", "KeyboardEvent", "InputEvent", "FocusEvent", "CustomEvent",
    "EventTarget", "Response", "Request", "Headers", "FormData", "Blob", "File",
    "FileReader", "URLSearchParams", "AbortController", "AbortSignal", "WebSocket",
    "Worker", "Storage", "TextEncoder", "TextDecoder", "ReadableStream",
    "WritableStream", "Performance", "IntersectionObserver", "ResizeObserver",
    "MutationObserver", "Notification", "Crypto", "NodeJS", "Timeout",
    // React / Node / framework scaffolding
    "React", "ReactNode", "ReactElement", "JSX", "FC", "Component", "PureComponent",
    "Fragment", "CSSProperties", "ChangeEvent", "FormEvent", "SyntheticEvent",
    "RefObject", "MutableRefObject", "Dispatch", "SetStateAction", "PropsWithChildren",
    "NextPage", "NextApiRequest", "NextApiResponse", "GetServerSideProps",
    "GetStaticProps", "AppProps", "Express", "Router", "NextFunction", "Injectable",
    "Controller", "Get", "Post", "Put", "Delete", "Patch", "Param", "Inject", "Observable", "Subject", "BehaviorSubject", "EventEmitter",
    // test frameworks
    "Mock", "Mocked", "SpyInstance", "Jest",
];

/// Returns the fixed set of known names for a dialect, including the shared list.
pub fn known_types(dialect: Dialect) -> HashSet<&'static str> {
    let specific = match dialect {
        Dialect::CSharp => CSHARP,
        Dialect::TypeScript => TYPESCRIPT,
    };
    SHARED.iter().chain(specific).copied().collect()
}

/// True when `name` is known in any of `dialects`.
pub fn is_known(name: &str, dialects: &[Dialect]) -> bool {
    SHARED.contains(&name)
        || dialects.iter().any(|d| match d {
            Dialect::CSharp => CSHARP.contains(&name),
            Dialect::TypeScript => TYPESCRIPT.contains(&name),
        })
}
