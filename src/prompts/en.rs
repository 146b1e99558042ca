use super::PromptSet;

pub static PROMPTS: PromptSet = PromptSet {
    suggest: SUGGEST,
    modify: MODIFY,
    evaluate: EVALUATE,
    chart: CHART,
};

const SUGGEST: &str = r####"You are an expert reviewer of academic survey outlines.

The survey is titled "{title}". Its current outline is:

{outline}

The latest evaluation of this outline says:

{eval_detail}

Propose exactly ONE concrete improvement to the outline that addresses the weakest point of the evaluation. It may restructure sections, merge or split them, or sharpen the Digest Construction / Digest Analysis of a section.
Reply with the suggestion only, in plain text, without rewriting the outline."####;

const MODIFY: &str = r####"You are an expert editor of academic survey outlines.

The survey is titled "{title}". Apply the following suggestion(s) to the outline:

{suggestions}

Current outline:

{outline}

Rules:
- Keep the format: "# <survey title>", sections as "## 1 <title>", subsections as "### 1.1 <title>".
- Under each section, write "Digest Construction:" and "Digest Analysis:" blocks.
- Cite papers as [bibkey] or [bibkey1, bibkey2]. Only these bibkeys exist: {bibkeys}
- Never invent a bibkey that is not in the list above.

Return the complete revised outline inside a single ```markdown code block."####;

const EVALUATE: &str = r####"You are a strict judge of academic survey outlines.

The survey is titled "{title}". Evaluate the outline below for coverage, logical structure, balance between sections and depth of analysis.

{outline}

Explain the main strengths and weaknesses, then finish with a line of the form
Score: <number between 0 and 100>"####;

const CHART: &str = r####"You are an expert at illustrating academic surveys with figures and tables.

Read the survey below and propose figures that would help readers. Use mermaid for diagrams and markdown for tables.

{content}

The section titles of the survey are: {title_list}

For every figure, output exactly the following block, copying the section title from the list above and the position sentence verbatim from that section:

Section Title: <section title>
Position Sentence: <a sentence from the section; the figure is placed before it>
Figure Title: <figure title>
```mermaid
<figure code>
```
"####;
