pub const DOC_CONTEXT: char = '$';
pub const EVAL_CONTEXT: char = '@';

pub const OPEN_SQUARE_BRACKET: char = '[';
pub const CLOSE_SQUARE_BRACKET: char = ']';
pub const OPEN_PARENTHESIS: char = '(';
pub const CLOSE_PARENTHESIS: char = ')';

pub const WILDCARD: char = '*';
pub const PERIOD: char = '.';
pub const BEGIN_FILTER: char = '?';
pub const COMMA: char = ',';
pub const SPLIT: char = ':';
pub const MINUS: char = '-';
pub const PLUS: char = '+';
pub const UNDERSCORE: char = '_';
pub const SINGLE_QUOTE: char = '\'';
pub const DOUBLE_QUOTE: char = '"';
pub const ESCAPE: char = '\\';
pub const NOT: char = '!';

pub const AND: &str = "&&";
pub const OR: &str = "||";
